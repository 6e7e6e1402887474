use crate::assess::Scorer;
use crate::config::Config;
use crate::envelope::EnvelopeKey;

pub struct AppState {
    pub scorer: Scorer,
    pub envelope_key: EnvelopeKey,
    pub reputation_configured: bool,
    pub config: Config,
}
