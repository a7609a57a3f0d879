pub mod badges;
pub mod calendar;
pub mod metrics;
pub mod stats;
pub mod streak;

#[cfg(test)]
pub mod test_support;

pub use badges::BadgeCatalogue;
pub use stats::StatsService;
