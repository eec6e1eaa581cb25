// Interface adapters: wire protocol, feed connection, storage, and the user-facing surfaces.

pub mod console;
pub mod http;
pub mod net;
pub mod protocol;
pub mod routes;
pub mod state;
pub mod storage;
pub mod view;
