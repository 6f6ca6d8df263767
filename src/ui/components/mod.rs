pub mod pitch;
pub mod playhead;
pub mod track_controls;
