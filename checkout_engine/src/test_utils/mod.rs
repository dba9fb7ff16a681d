//! Test fixtures: throw-away databases, a controllable clock, an in-memory payment gateway and sample requests.
pub mod fake_gateway;
pub mod fixed_clock;
pub mod prepare_env;
pub mod requests;

pub use fake_gateway::FakeGateway;
pub use fixed_clock::FixedClock;
pub use requests::{checkout_request, webhook_body};
