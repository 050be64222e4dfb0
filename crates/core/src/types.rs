/// Frame numbers as emitted by the pose-estimation model.
pub type FrameIndex = u64;

/// Angles are carried in degrees throughout the engine.
pub type Degrees = f64;

/// Workouts are dated by calendar day, without a time component.
pub type WorkoutDate = chrono::NaiveDate;
