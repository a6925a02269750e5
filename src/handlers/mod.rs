// Two tiers: public session endpoints, and the gated admin surface.
pub mod admin;
pub mod public;
