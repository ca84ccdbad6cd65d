//! UI components for Minipad

pub mod editor;
pub mod preview;
pub mod search;
pub mod settings;
pub mod tabs;
pub mod theme;
