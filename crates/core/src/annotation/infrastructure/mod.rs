pub mod box_overlay_renderer;
