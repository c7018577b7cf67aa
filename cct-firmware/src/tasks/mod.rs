// Task-Modul: Enthält alle Embassy Tasks
//
// Jeder Task läuft asynchron und unabhängig.
// Button, HTTP und Resync senden LightEvents an den Light Task,
// der Light Task schreibt Ziel-Duties in die Fade-Queue des Fade Workers.

pub mod button;
pub mod fade;
pub mod http;
pub mod light;
pub mod resync;
pub mod wifi;

// Re-export Tasks für einfachen Import
pub use button::button_task;
pub use fade::fade_worker_task;
pub use http::http_server_task;
pub use light::light_task;
pub use resync::resync_task;
pub use wifi::{connection_task, dhcp_task, net_task};
