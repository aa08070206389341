use crate::service::MemeService;

pub(crate) struct ServerState {
    pub(crate) service: MemeService,
}
