pub mod classifier_trait;
pub mod decision_tree;
pub mod factory;
pub mod lda;
pub mod logistic;

pub use classifier_trait::Classifier;
pub use factory::Estimator;
