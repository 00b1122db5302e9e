use crate::errors::SearchError;


/// Number of child slots on every priority tree node
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FanOut(usize);

impl FanOut {

    pub const DEFAULT: FanOut = FanOut(4);

    /// Rejects anything below 2: a single slot degenerates the tree into a list
    pub fn new(k: usize) -> Result<Self, SearchError> {
        if k < 2 {
            return Err(SearchError::InvalidFanOut(k));
        }
        Ok(Self(k))
    }

    pub fn get(self) -> usize {
        self.0
    }
}

impl Default for FanOut {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl TryFrom<usize> for FanOut {
    type Error = SearchError;

    fn try_from(k: usize) -> Result<Self, Self::Error> {
        Self::new(k)
    }
}


/// How the bidirectional search picks the join point once both frontiers meet
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum MeetingRule {
    /// Keep expanding until no cheaper join can exist, then scan every position
    /// known to both directions and join at the one with the smallest combined cost
    #[default]
    MinimumSum,
    /// Join at the position whose claim collided first. Cheaper, but the result is
    /// not guaranteed to be a shortest path
    FirstMeeting,
}


/// Construction-time settings shared by the unidirectional and bidirectional drivers
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SearchConfig {
    pub fan_out: FanOut,
    pub seed: Option<u64>, // None draws every frontier's generator from OS entropy
    pub meeting: MeetingRule,
}

impl SearchConfig {

    pub fn new(fan_out: usize) -> Result<Self, SearchError> {
        Ok(Self {
            fan_out: FanOut::new(fan_out)?,
            ..Self::default()
        })
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_meeting(mut self, meeting: MeetingRule) -> Self {
        self.meeting = meeting;
        self
    }

    /// Seed for the backward direction, derived so the two frontiers never share a stream
    pub(crate) fn backward_seed(&self) -> Option<u64> {
        self.seed.map(|s| s ^ 0x9E37_79B9_7F4A_7C15)
    }
}
