pub mod analysis;
pub mod job_posting;
pub mod skill;
