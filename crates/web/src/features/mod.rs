pub mod late_comers;
pub mod marks;
pub mod reports;
