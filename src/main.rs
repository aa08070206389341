use anyhow::Result;
use clap::Parser;

#[derive(Parser, Debug)]
#[command(
    name = "meme-caption",
    version,
    about = "Fit captions into meme templates and render them as JPEG"
)]
struct Cli {
    /// Meme id from the catalog (e.g. drake)
    #[arg(long = "meme")]
    meme: Option<String>,

    /// Caption text, one per box in order (repeat for each box)
    #[arg(short = 't', long = "text")]
    texts: Vec<String>,

    /// Output file (default: <meme>.jpg, "-" for stdout)
    #[arg(short = 'o', long = "output")]
    output: Option<String>,

    /// List known memes and exit
    #[arg(long = "list-memes")]
    list_memes: bool,

    /// Run the HTTP service
    #[arg(long = "serve")]
    serve: bool,

    /// Bind address for --serve (overrides settings [server] addr)
    #[arg(long = "addr")]
    addr: Option<String>,

    /// Read extra settings from a local TOML file
    #[arg(short = 'r', long = "read-settings")]
    read_settings: Option<String>,

    /// Measure lines with real glyph advances instead of the space width
    #[arg(long = "exact-width")]
    exact_width: bool,

    /// Outline caption boxes on the output
    #[arg(long = "debug-boxes")]
    debug_boxes: bool,

    /// Enable verbose logging
    #[arg(long = "verbose")]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    meme_caption::logging::init(cli.verbose)?;

    let output = meme_caption::run(meme_caption::Config {
        meme: cli.meme,
        texts: cli.texts,
        output: cli.output,
        list_memes: cli.list_memes,
        serve: cli.serve,
        addr: cli.addr,
        settings_path: cli.read_settings,
        exact_width: cli.exact_width,
        debug_boxes: cli.debug_boxes,
    })
    .await?;

    if !output.is_empty() {
        println!("{}", output);
    }
    Ok(())
}
