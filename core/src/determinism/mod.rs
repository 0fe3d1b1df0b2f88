pub mod clock;
pub mod fingerprint;
pub mod record_id;
