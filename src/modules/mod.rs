pub mod assessment;
pub mod course;
pub mod lesson;
pub mod pipeline;
pub mod provider;
pub mod tutor;
