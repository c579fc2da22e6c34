pub mod late_comers;
pub mod marks;
pub mod payment;
pub mod report;
