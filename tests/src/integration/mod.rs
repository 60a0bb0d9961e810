//! End-to-end flows through the admin HTTP router.

pub mod harness;

#[cfg(test)]
mod concurrency;
#[cfg(test)]
mod http_flows;
#[cfg(test)]
mod persistence;
