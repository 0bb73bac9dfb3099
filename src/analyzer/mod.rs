pub mod classifier;
pub mod engine;
pub mod features;
pub mod profile;
pub mod rep_state;

pub use classifier::{Classifier, ClassifierOutcome, OnnxClassifier};
pub use engine::{AnalysisResult, ExerciseAnalyzer, LABEL_NONE, LABEL_UNKNOWN};
pub use features::{feature_vector, FEATURE_COUNT, FEATURE_ORDER};
pub use profile::{ExerciseProfile, FormRule, ProfileTable};
pub use rep_state::{RepState, Stage, ANGLE_HISTORY_CAPACITY};
