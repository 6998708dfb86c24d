//! Rows of the built-in cat endpoints.
//!
//! Cat values are rendered as strings by the cluster, and the set of columns depends on the
//! `h` parameter, so every column is an optional string.

use serde::Deserialize;

use super::{CatEndpoint, CatTarget};

macro_rules! cat_endpoint {
    (
        $(#[$meta:meta])*
        $endpoint:ident => $name:literal, $target:ident, $record:ident
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
        pub struct $endpoint;

        impl CatEndpoint for $endpoint {
            const NAME: &'static str = $name;
            const TARGET: CatTarget = CatTarget::$target;
            type Record = $record;
        }
    };
}

cat_endpoint! {
    /// `/_cat/aliases`, targeted by alias name.
    CatAliases => "aliases", Names, CatAliasesRecord
}

cat_endpoint! {
    /// `/_cat/allocation`, targeted by node id.
    CatAllocation => "allocation", NodeIds, CatAllocationRecord
}

cat_endpoint! {
    /// `/_cat/count`, targeted by index.
    CatCount => "count", Indices, CatCountRecord
}

cat_endpoint! {
    /// `/_cat/health`.
    CatHealth => "health", None, CatHealthRecord
}

cat_endpoint! {
    /// `/_cat/indices`, targeted by index.
    CatIndices => "indices", Indices, CatIndicesRecord
}

cat_endpoint! {
    /// `/_cat/master`.
    CatMaster => "master", None, CatMasterRecord
}

cat_endpoint! {
    /// `/_cat/nodes`.
    CatNodes => "nodes", None, CatNodesRecord
}

cat_endpoint! {
    /// `/_cat/pending_tasks`.
    CatPendingTasks => "pending_tasks", None, CatPendingTasksRecord
}

cat_endpoint! {
    /// `/_cat/plugins`.
    CatPlugins => "plugins", None, CatPluginsRecord
}

cat_endpoint! {
    /// `/_cat/shards`, targeted by index.
    CatShards => "shards", Indices, CatShardsRecord
}

/// Row of `/_cat/aliases`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CatAliasesRecord {
    /// Alias name.
    pub alias: Option<String>,
    /// Index the alias points to.
    pub index: Option<String>,
    /// Whether a filter is attached (`*` or `-`).
    pub filter: Option<String>,
    /// Index routing.
    #[serde(rename = "routing.index")]
    pub routing_index: Option<String>,
    /// Search routing.
    #[serde(rename = "routing.search")]
    pub routing_search: Option<String>,
}

/// Row of `/_cat/allocation`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CatAllocationRecord {
    /// Number of shards on the node.
    pub shards: Option<String>,
    /// Disk used by the indices.
    #[serde(rename = "disk.indices")]
    pub disk_indices: Option<String>,
    /// Disk used.
    #[serde(rename = "disk.used")]
    pub disk_used: Option<String>,
    /// Disk available.
    #[serde(rename = "disk.avail")]
    pub disk_available: Option<String>,
    /// Total disk size.
    #[serde(rename = "disk.total")]
    pub disk_total: Option<String>,
    /// Percentage of disk used.
    #[serde(rename = "disk.percent")]
    pub disk_percent: Option<String>,
    /// Host name.
    pub host: Option<String>,
    /// IP address.
    pub ip: Option<String>,
    /// Node name.
    pub node: Option<String>,
}

/// Row of `/_cat/count`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CatCountRecord {
    /// Seconds since the Unix epoch.
    pub epoch: Option<String>,
    /// Wall clock time, `HH:MM:SS`.
    pub timestamp: Option<String>,
    /// Document count.
    pub count: Option<String>,
}

/// Row of `/_cat/health`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CatHealthRecord {
    /// Seconds since the Unix epoch.
    pub epoch: Option<String>,
    /// Wall clock time, `HH:MM:SS`.
    pub timestamp: Option<String>,
    /// Cluster name.
    pub cluster: Option<String>,
    /// `green`, `yellow` or `red`.
    pub status: Option<String>,
    /// Number of nodes.
    #[serde(rename = "node.total")]
    pub node_total: Option<String>,
    /// Number of data nodes.
    #[serde(rename = "node.data")]
    pub node_data: Option<String>,
    /// Number of shards.
    pub shards: Option<String>,
    /// Number of primary shards.
    pub pri: Option<String>,
    /// Number of relocating shards.
    pub relo: Option<String>,
    /// Number of initializing shards.
    pub init: Option<String>,
    /// Number of unassigned shards.
    pub unassign: Option<String>,
    /// Number of pending tasks.
    pub pending_tasks: Option<String>,
}

/// Row of `/_cat/indices`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CatIndicesRecord {
    /// Index health.
    pub health: Option<String>,
    /// `open` or `close`.
    pub status: Option<String>,
    /// Index name.
    pub index: Option<String>,
    /// Number of primary shards.
    pub pri: Option<String>,
    /// Number of replicas.
    pub rep: Option<String>,
    /// Number of documents.
    #[serde(rename = "docs.count")]
    pub docs_count: Option<String>,
    /// Number of deleted documents.
    #[serde(rename = "docs.deleted")]
    pub docs_deleted: Option<String>,
    /// Store size, replicas included.
    #[serde(rename = "store.size")]
    pub store_size: Option<String>,
    /// Store size of the primaries.
    #[serde(rename = "pri.store.size")]
    pub primary_store_size: Option<String>,
}

/// Row of `/_cat/master`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CatMasterRecord {
    /// Node id.
    pub id: Option<String>,
    /// Host name.
    pub host: Option<String>,
    /// IP address.
    pub ip: Option<String>,
    /// Node name.
    pub node: Option<String>,
}

/// Row of `/_cat/nodes`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CatNodesRecord {
    /// Node id.
    pub id: Option<String>,
    /// Host name.
    pub host: Option<String>,
    /// IP address.
    pub ip: Option<String>,
    /// Heap usage percentage.
    #[serde(rename = "heap.percent")]
    pub heap_percent: Option<String>,
    /// Memory usage percentage.
    #[serde(rename = "ram.percent")]
    pub ram_percent: Option<String>,
    /// Load average.
    pub load: Option<String>,
    /// `d` for data nodes, `c` for client nodes.
    #[serde(rename = "node.role")]
    pub node_role: Option<String>,
    /// `*` for the elected master, `m` for master-eligible nodes.
    pub master: Option<String>,
    /// Node name.
    pub name: Option<String>,
}

/// Row of `/_cat/pending_tasks`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CatPendingTasksRecord {
    /// Task order.
    #[serde(rename = "insertOrder")]
    pub insert_order: Option<String>,
    /// How long the task has been waiting.
    #[serde(rename = "timeInQueue")]
    pub time_in_queue: Option<String>,
    /// Task priority.
    pub priority: Option<String>,
    /// Task source.
    pub source: Option<String>,
}

/// Row of `/_cat/plugins`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CatPluginsRecord {
    /// Node name.
    pub name: Option<String>,
    /// Plugin name.
    pub component: Option<String>,
    /// Plugin version.
    pub version: Option<String>,
    /// `j` for Java plugins, `s` for site plugins.
    #[serde(rename = "type")]
    pub plugin_type: Option<String>,
    /// Plugin URL.
    pub url: Option<String>,
    /// Plugin description.
    pub description: Option<String>,
}

/// Row of `/_cat/shards`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CatShardsRecord {
    /// Index name.
    pub index: Option<String>,
    /// Shard number.
    pub shard: Option<String>,
    /// `p` for primaries, `r` for replicas.
    pub prirep: Option<String>,
    /// Shard state.
    pub state: Option<String>,
    /// Number of documents.
    pub docs: Option<String>,
    /// Store size.
    pub store: Option<String>,
    /// IP address of the node.
    pub ip: Option<String>,
    /// Node name.
    pub node: Option<String>,
}
