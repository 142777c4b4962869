use chrono::{Duration, NaiveDateTime};

use funnelforge_core::{AcquisitionChannel, Country, User};

use crate::draws::DrawSource;

/// Mean of the Poisson day offset between the base epoch and a signup.
pub const SIGNUP_OFFSET_MEAN_DAYS: f64 = 30.0;

/// Produce the user population in insertion order.
///
/// Per user the draw order is fixed: identifier, signup offset, acquisition
/// channel, country. Signup instants may collide across users.
pub fn generate_users(
    count: u64,
    base: NaiveDateTime,
    draws: &mut impl DrawSource,
) -> Vec<User> {
    let mut users = Vec::with_capacity(count as usize);
    for _ in 0..count {
        let user_id = draws.uuid();
        let offset_days = draws.poisson(SIGNUP_OFFSET_MEAN_DAYS);
        users.push(User {
            user_id,
            signup_at: base + Duration::days(offset_days),
            acquisition_channel: *draws.pick(&AcquisitionChannel::ALL),
            country: *draws.pick(&Country::ALL),
        });
    }
    users
}
