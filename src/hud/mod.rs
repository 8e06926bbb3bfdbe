pub(crate) mod cache;
pub(crate) mod canvas;
pub(crate) mod compositor;
pub(crate) mod layout;
pub(crate) mod mask;
pub(crate) mod text;
pub(crate) mod warp;
pub(crate) mod widgets;
