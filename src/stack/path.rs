//! 最短跳数路径
//!
//! 在有向邻接表上做 BFS。邻居按安装顺序遍历，所以结果是确定的。

use std::collections::VecDeque;

use crate::net::NodeId;

/// 返回 `src` 到 `dst` 的节点序列（含两端）；不可达时返回 None。
pub fn shortest_path(adj: &[Vec<NodeId>], src: NodeId, dst: NodeId) -> Option<Vec<NodeId>> {
    if src.0 >= adj.len() || dst.0 >= adj.len() {
        return None;
    }
    if src == dst {
        return Some(vec![src]);
    }

    let mut prev: Vec<Option<NodeId>> = vec![None; adj.len()];
    let mut seen = vec![false; adj.len()];
    let mut q = VecDeque::new();
    seen[src.0] = true;
    q.push_back(src);

    while let Some(v) = q.pop_front() {
        for &next in &adj[v.0] {
            if seen[next.0] {
                continue;
            }
            seen[next.0] = true;
            prev[next.0] = Some(v);
            if next == dst {
                let mut path = vec![dst];
                let mut cur = dst;
                while let Some(p) = prev[cur.0] {
                    path.push(p);
                    cur = p;
                }
                path.reverse();
                return Some(path);
            }
            q.push_back(next);
        }
    }
    None
}
