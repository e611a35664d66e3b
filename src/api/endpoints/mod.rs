pub mod adherence;
pub mod doses;
pub mod health;
pub mod medications;
pub mod schedule;
