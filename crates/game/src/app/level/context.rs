/// State shared between props within one level.
///
/// Buttons are the only writers; see `Level::tick`. `wind` turns on once any
/// button has been touched and stays on until the level reloads.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct LevelContext {
    wind: bool,
}

impl LevelContext {
    pub(crate) fn wind(&self) -> bool {
        self.wind
    }

    pub(crate) fn set_wind(&mut self, wind: bool) {
        self.wind = wind;
    }
}
