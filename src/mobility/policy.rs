use serde::{Deserialize, Serialize};

/// 平面坐标（米）
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

/// 静态网格：从原点开始按行填充，每行 `columns` 个位置。
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridLayout {
    pub origin_x: f64,
    pub origin_y: f64,
    pub spacing_x: f64,
    pub spacing_y: f64,
    pub columns: usize,
}

impl GridLayout {
    /// 第 `index` 个网格位置
    pub fn position(&self, index: usize) -> Position {
        let columns = self.columns.max(1);
        Position {
            x: self.origin_x + (index % columns) as f64 * self.spacing_x,
            y: self.origin_y + (index / columns) as f64 * self.spacing_y,
        }
    }
}

/// 有界随机游走：区域 `[0, width] x [0, height]`，速度（m/s），
/// 每走 `turn_distance` 米重新选择方向。
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RandomWalkBounds {
    pub width: f64,
    pub height: f64,
    pub speed: f64,
    pub turn_distance: f64,
}

/// 节点记录的移动策略
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MobilityPolicy {
    Static { position: Position },
    RandomWalk { bounds: RandomWalkBounds },
}
