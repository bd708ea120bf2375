pub mod reconciler;
pub mod share;
pub mod snapshot;

pub use reconciler::StateReconciler;
pub use share::{SHARE_PARAM, decode_share_value, encode_share_value, query_param, with_query_param};
pub use snapshot::{LEGACY_SNAPSHOT_KEYS, LayerError, SNAPSHOT_KEY, apply_layer, decode_layer, encode_state};
