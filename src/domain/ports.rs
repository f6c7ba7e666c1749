use super::channel::ChannelRegistry;
use crate::error::Result;

/// Where a run's channel configuration comes from.
pub trait ScheduleSource: Send + Sync {
    fn load(&self) -> Result<ChannelRegistry>;
}

pub type ScheduleSourceBox = Box<dyn ScheduleSource>;
