pub mod memory;
pub mod redis_store;
pub mod store;

pub use memory::MemoryStore;
pub use redis_store::{create_client, health_check, RedisStore};
pub use store::WindowStore;
