//! 事件录制
//!
//! 显式的 [`RecordingHandle`] 贯穿每次追加调用，不存在“当前录制”这种全局单例。

mod pending;
mod recorder;
mod source;

pub use recorder::{Recorder, RecorderStats, SessionInfo};
pub use source::{InputSender, RawInput, RecordingHandle, SourceKind};
