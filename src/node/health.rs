use futures::future::join_all;

use crate::network::client::RpcClient;
use crate::node::Node;

/// Queries every node once and returns the names of those that did not answer.
pub async fn unreachable_nodes<C: RpcClient>(nodes: &[Node<C>]) -> Vec<String> {
    let health_check_tasks: Vec<_> = nodes
        .iter()
        .map(|node| async move {
            match node.get_dynamic_global_properties().await {
                Ok(props) => {
                    tracing::debug!(node = node.name(), props.head_block_number, "Node is reachable");
                    None
                }
                Err(e) => {
                    tracing::warn!(node = node.name(), error = %e, "Node is unreachable");
                    Some(node.name().to_string())
                }
            }
        })
        .collect();

    join_all(health_check_tasks)
        .await
        .into_iter()
        .flatten()
        .collect()
}
