mod cascade;

pub use cascade::{CascadeSet, ShadowCascade, CASCADE_COUNT, CASCADE_SPLITS};
