use crate::models::BlockId;

/// UI chrome to activate inside freshly inserted blocks (tooltips and the like).
pub trait ChromeActivation: Send {
    fn activate(&mut self, inserted: &[BlockId]);
}

/// Chrome activation that does nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoChrome;

impl ChromeActivation for NoChrome {
    fn activate(&mut self, _inserted: &[BlockId]) {}
}

/// Chrome activation that reports insertions through the `log` facade.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogChrome;

impl ChromeActivation for LogChrome {
    fn activate(&mut self, inserted: &[BlockId]) {
        log::debug!("Activating chrome for {} inserted block(s)", inserted.len());
    }
}
