//! 演示和示例代码
//!
//! 一个仿照“图片查看器 + Yes/No 按钮”仪表盘的内存表面，以及一段脚本化的交互会话。

use crate::error::Result;
use crate::event::{Action, PointerPhase, Position};
use crate::record::{RawInput, Recorder, SessionInfo, SourceKind};
use crate::recording::Recording;
use crate::snapshot::{DomTree, NamingConvention, SnapshotBuilder, SurfaceKey};
use crate::time::SessionTime;
use serde_json::json;
use tracing::{debug, info};

/// 仪表盘表面及其关键节点
#[derive(Debug, Clone)]
pub struct Dashboard {
    pub tree: DomTree,
    pub start_button: SurfaceKey,
    pub stop_button: SurfaceKey,
    pub viewer: SurfaceKey,
    pub image: SurfaceKey,
    pub yes_button: SurfaceKey,
    pub no_button: SurfaceKey,
}

/// 构建仪表盘
///
/// 结构：body > [controls > (start, stop, status)] [viewer > svg] [decision > (yes, no)]
pub fn build_dashboard(naming: &NamingConvention) -> Dashboard {
    let attr = naming.component_attribute.as_str();
    let mut tree = DomTree::new("body");
    let root = tree.root_key();

    let controls = add(&mut tree, root, "div", &[("class", "demo-card rrweb-controls")]);
    let start_button = add(
        &mut tree,
        controls,
        "button",
        &[(attr, "start-recording"), ("id", "rrweb-start")],
    );
    let stop_button = add(
        &mut tree,
        controls,
        "button",
        &[(attr, "stop-recording"), ("id", "rrweb-stop")],
    );
    add(&mut tree, controls, "span", &[("class", "rrweb-pill")]);

    let viewer = add(
        &mut tree,
        root,
        "div",
        &[(attr, "main-visualization"), ("id", "demo-viewer")],
    );
    let image = add(&mut tree, viewer, "svg", &[("title", "demo image")]);

    let decision = add(&mut tree, root, "div", &[("class", "demo-card")]);
    let yes_button = add(&mut tree, decision, "button", &[(attr, "decision-yes")]);
    let no_button = add(&mut tree, decision, "button", &[("name", "decision-no")]);

    Dashboard {
        tree,
        start_button,
        stop_button,
        viewer,
        image,
        yes_button,
        no_button,
    }
}

// 父节点都是刚刚创建的，append 不会失败
fn add(tree: &mut DomTree, parent: SurfaceKey, tag: &str, attrs: &[(&str, &str)]) -> SurfaceKey {
    tree.append(parent, tag, attrs).unwrap_or(parent)
}

/// 脚本化会话参数
#[derive(Debug, Clone)]
pub struct ScriptOpts {
    /// 拖拽平移的采样点数
    pub pan_steps: u32,
    /// 滚轮缩放次数
    pub zoom_steps: u32,
    /// 相邻输入的间隔（毫秒）
    pub gap_ms: u64,
}

impl Default for ScriptOpts {
    fn default() -> Self {
        Self {
            pan_steps: 8,
            zoom_steps: 4,
            gap_ms: 40,
        }
    }
}

/// 在仪表盘上录制一段脚本化会话并返回录制结果
pub fn record_scripted_session(
    dash: &Dashboard,
    naming: &NamingConvention,
    first_id: u64,
    opts: &ScriptOpts,
) -> Result<Recording> {
    let snapshot = SnapshotBuilder::new(naming.clone(), first_id).build(&dash.tree)?;
    let mut recorder = Recorder::new();
    let handle = recorder.start(
        snapshot,
        SessionInfo {
            url: "http://localhost:5006/app".to_string(),
            user_agent: "uirec-demo/0.1".to_string(),
            width: 1280,
            height: 800,
        },
    );
    let (Some(pointer), Some(clicks), Some(scroll)) = (
        recorder.subscribe(SourceKind::Pointer),
        recorder.subscribe(SourceKind::Click),
        recorder.subscribe(SourceKind::Scroll),
    ) else {
        return Ok(recorder.stop(&handle));
    };

    let mut t = 0_u64;
    let mut tick = || {
        t += opts.gap_ms;
        SessionTime(t)
    };
    let input = |source, action, timestamp| RawInput {
        source,
        action,
        timestamp,
    };

    let at = Position::new(40.0, 24.0);
    pointer.deliver(input(dash.start_button, Action::PointerMove { at }, tick()));
    clicks.deliver(input(dash.start_button, Action::Click { at }, tick()));

    // 拖拽平移：按下 → 若干移动 → 抬起
    let mut pos = Position::new(400.0, 300.0);
    pointer.deliver(input(
        dash.image,
        Action::PointerInteraction {
            phase: PointerPhase::Down,
            at: Some(pos),
        },
        tick(),
    ));
    for _ in 0..opts.pan_steps {
        pos = Position::new(pos.x + 12.0, pos.y + 5.0);
        pointer.deliver(input(dash.image, Action::PointerMove { at: pos }, tick()));
    }
    pointer.deliver(input(
        dash.image,
        Action::PointerInteraction {
            phase: PointerPhase::Up,
            at: Some(pos),
        },
        tick(),
    ));

    // 滚轮缩放
    for step in 1..=opts.zoom_steps {
        let offset = Position::new(0.0, f64::from(step) * 120.0);
        scroll.deliver(input(dash.viewer, Action::Scroll { offset }, tick()));
    }

    let captured = tick();
    let payload = json!({
        "snapshots": [{ "id": "demo-viewer", "width": 800, "height": 520, "sizeKB": 42 }]
    });
    if let serde_json::Value::Object(payload) = payload {
        handle.append_custom(captured, "canvas-snapshot", payload);
    }

    let yes_at = Position::new(900.0, 610.0);
    clicks.deliver(input(dash.yes_button, Action::Click { at: yes_at }, tick()));
    let no_at = Position::new(1020.0, 610.0);
    clicks.deliver(input(dash.no_button, Action::Click { at: no_at }, tick()));

    // 表面之外的输入会被录制器丢弃
    clicks.deliver(input(
        SurfaceKey(usize::MAX),
        Action::Click {
            at: Position::new(1.0, 1.0),
        },
        tick(),
    ));
    let pumped = recorder.pump();
    debug!(pumped, "脚本输入已投递");

    clicks.deliver(input(
        dash.stop_button,
        Action::Click {
            at: Position::new(140.0, 24.0),
        },
        tick(),
    ));

    let recording = recorder.stop(&handle);
    info!(
        events = recording.len(),
        dropped = recorder.stats().dropped_unknown_node,
        "演示会话录制完成"
    );
    Ok(recording)
}
