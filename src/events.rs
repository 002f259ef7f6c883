/// Emitted once per click that lands on an item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemSelected {
    pub id: String,
}

/// Viewer -> loader: fetch and decode the image for the given catalogue slot.
#[derive(Debug, Clone)]
pub struct LoadImage {
    pub item: usize,
    pub url: String,
}

#[derive(Debug, Clone)]
pub struct DecodedImage {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

/// Loader -> viewer: decoded RGBA8 pixels for every slot that asked for `url`.
#[derive(Debug, Clone)]
pub struct ImageLoaded {
    pub items: Vec<usize>,
    pub url: String,
    pub image: DecodedImage,
}
