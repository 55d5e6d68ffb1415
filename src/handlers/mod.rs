// Handlers are split by security tier:
// public (no auth) and protected (bearer token + known user).
pub mod protected;
pub mod public;
