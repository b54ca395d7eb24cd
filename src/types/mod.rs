pub mod interval;
pub mod key_signature;
pub mod note;
pub mod pitch;
pub mod tempo;
pub mod time_signature;
