use chrono::{DateTime, Utc};
use chrono_tz::Tz;

/// Current instant as seen from the service timezone.
pub fn now_local(tz: &Tz) -> DateTime<Tz> {
    Utc::now().with_timezone(tz)
}

/// Current instant normalized back to UTC. Every timestamp the crate
/// persists is produced here, so swapping the clock source later only
/// touches this module.
pub fn now_utc(tz: &Tz) -> DateTime<Utc> {
    now_local(tz).with_timezone(&Utc)
}
