use super::policy::{GridLayout, MobilityPolicy, Position, RandomWalkBounds};
use super::MobilityProvider;
use crate::error::{Result, ScenarioError};
use crate::net::NodeId;
use crate::topo::Topology;
use tracing::{debug, info};

/// 两个静态位置距离小于该值视为重叠（米）
const MIN_SEPARATION: f64 = 1e-6;

/// 移动性配置器
///
/// 校验参数并把每个节点的策略同时写入拓扑表和外部提供者。
/// 跨多次调用记住已经占用的静态位置，保证不同节点类别的网格不重叠。
pub struct MobilityConfigurator<'a, P: MobilityProvider + ?Sized> {
    provider: &'a mut P,
    placed: Vec<(NodeId, Position)>,
}

impl<'a, P: MobilityProvider + ?Sized> MobilityConfigurator<'a, P> {
    pub fn new(provider: &'a mut P) -> Self {
        Self {
            provider,
            placed: Vec::new(),
        }
    }

    /// 为一组基础设施节点设置静态网格位置
    #[tracing::instrument(skip(self, topo, nodes), fields(nodes = nodes.len()))]
    pub fn set_static_grid(
        &mut self,
        topo: &mut Topology,
        nodes: &[NodeId],
        layout: &GridLayout,
    ) -> Result<()> {
        let finite = [layout.origin_x, layout.origin_y, layout.spacing_x, layout.spacing_y]
            .iter()
            .all(|v| v.is_finite());
        if !finite {
            return Err(ScenarioError::InvalidMobilityBounds(
                "grid parameters must be finite".into(),
            ));
        }
        if layout.columns == 0 {
            return Err(ScenarioError::InvalidMobilityBounds(
                "grid must have at least one column".into(),
            ));
        }
        if layout.spacing_x <= 0.0 || layout.spacing_y <= 0.0 {
            return Err(ScenarioError::InvalidMobilityBounds(format!(
                "grid spacing ({}, {}) must be positive",
                layout.spacing_x, layout.spacing_y
            )));
        }

        for (idx, &node) in nodes.iter().enumerate() {
            let position = layout.position(idx);
            if let Some((other, _)) = self.placed.iter().find(|(_, p)| {
                (p.x - position.x).abs() < MIN_SEPARATION && (p.y - position.y).abs() < MIN_SEPARATION
            }) {
                return Err(ScenarioError::InvalidMobilityBounds(format!(
                    "{node} would be placed at ({}, {}) on top of {other}",
                    position.x, position.y
                )));
            }
            self.provider
                .set_position(node, position)
                .map_err(ScenarioError::stack("set_position"))?;
            topo.set_mobility(node, MobilityPolicy::Static { position })?;
            self.placed.push((node, position));
            debug!(%node, x = position.x, y = position.y, "📍 静态位置");
        }
        info!(count = nodes.len(), "静态网格配置完成");
        Ok(())
    }

    /// 为一组移动节点设置有界随机游走
    #[tracing::instrument(skip(self, topo, nodes), fields(nodes = nodes.len()))]
    pub fn set_bounded_random_walk(
        &mut self,
        topo: &mut Topology,
        nodes: &[NodeId],
        bounds: &RandomWalkBounds,
    ) -> Result<()> {
        validate_walk(bounds)?;
        for &node in nodes {
            self.provider
                .set_random_walk(node, bounds)
                .map_err(ScenarioError::stack("set_random_walk"))?;
            topo.set_mobility(node, MobilityPolicy::RandomWalk { bounds: *bounds })?;
        }
        info!(
            count = nodes.len(),
            width = bounds.width,
            height = bounds.height,
            speed = bounds.speed,
            "🚶 随机游走配置完成"
        );
        Ok(())
    }
}

fn validate_walk(bounds: &RandomWalkBounds) -> Result<()> {
    let checks = [
        ("width", bounds.width),
        ("height", bounds.height),
        ("speed", bounds.speed),
        ("turn distance", bounds.turn_distance),
    ];
    for (name, value) in checks {
        // NaN 不满足 > 0，一并拒绝
        if !(value > 0.0 && value.is_finite()) {
            return Err(ScenarioError::InvalidMobilityBounds(format!(
                "{name} must be a positive finite number, got {value}"
            )));
        }
    }
    Ok(())
}
