pub mod fnv_hash_multi_map;
pub mod iter;
