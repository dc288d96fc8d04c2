//! Windows as stored by the Visdom server.

/// One trace of a plot window: parallel `x` and `y` samples.
///
/// Both arrays are optional on the wire (heatmaps, for example, carry `z`
/// instead). A `null` sample is decoded as NaN, which is how the server
/// writes NaN values.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
pub struct Trace {
    /// Legend name of the trace, if the plot set one.
    #[cfg_attr(feature = "serde", serde(default))]
    pub name: Option<String>,

    /// Sample positions.
    #[cfg_attr(
        feature = "serde",
        serde(default, deserialize_with = "de::nullable_samples")
    )]
    pub x: Option<Vec<f64>>,

    /// Sample values.
    #[cfg_attr(
        feature = "serde",
        serde(default, deserialize_with = "de::nullable_samples")
    )]
    pub y: Option<Vec<f64>>,
}

impl Trace {
    /// Create an unnamed trace with both sample arrays present.
    pub fn new(x: Vec<f64>, y: Vec<f64>) -> Self {
        Self {
            name: None,
            x: Some(x),
            y: Some(y),
        }
    }
}

/// The plot payload of a window (`content` on the wire).
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
pub struct PlotContent {
    /// Traces drawn in the window.
    pub data: Vec<Trace>,
}

/// A single stored window.
///
/// Only the fields needed to locate a feature and read its samples are
/// modelled. Windows whose content is not a plot (text panes, images)
/// decode with `content: None`.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
pub struct Window {
    /// Window title, used as the feature name.
    #[cfg_attr(feature = "serde", serde(default))]
    pub title: Option<String>,

    /// Plot content, if the window holds a plot.
    #[cfg_attr(
        feature = "serde",
        serde(default, deserialize_with = "de::plot_content")
    )]
    pub content: Option<PlotContent>,
}

impl Window {
    /// A window with a title and no plot content.
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            content: None,
        }
    }

    /// A plot window with the given traces.
    pub fn plot(title: impl Into<String>, data: Vec<Trace>) -> Self {
        Self {
            title: Some(title.into()),
            content: Some(PlotContent { data }),
        }
    }

    /// Check whether the title equals `title` exactly.
    pub fn has_title(&self, title: &str) -> bool {
        self.title.as_deref() == Some(title)
    }

    /// Traces of the window, if it holds a plot.
    pub fn traces(&self) -> Option<&[Trace]> {
        self.content.as_ref().map(|c| c.data.as_slice())
    }
}

/// All windows of one environment, keyed by window id.
///
/// Unlike a hash map this keeps the order in which the server listed the
/// windows, so "the first window with this title" is well defined.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct WindowMap {
    entries: Vec<(String, Window)>,
}

impl WindowMap {
    /// Create an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a window. A repeated id replaces the earlier window in place.
    pub fn insert(&mut self, id: impl Into<String>, window: Window) {
        let id = id.into();
        match self.entries.iter_mut().find(|(k, _)| *k == id) {
            Some(slot) => slot.1 = window,
            None => self.entries.push((id, window)),
        }
    }

    /// Number of windows.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if there are no windows.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Look up a window by id.
    pub fn get(&self, id: &str) -> Option<&Window> {
        self.entries.iter().find(|(k, _)| k == id).map(|(_, w)| w)
    }

    /// Iterate over `(id, window)` pairs in document order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Window)> {
        self.entries.iter().map(|(k, w)| (k.as_str(), w))
    }

    /// All windows whose title equals `title`, in document order.
    ///
    /// The yielded windows borrow from the map only, so they outlive `title`.
    pub fn titled<'a: 't, 't>(
        &'a self,
        title: &'t str,
    ) -> impl Iterator<Item = (&'a str, &'a Window)> + 't {
        self.iter().filter(move |(_, w)| w.has_title(title))
    }

    /// The first window whose title equals `title`.
    pub fn find_by_title(&self, title: &str) -> Option<(&str, &Window)> {
        self.iter().find(|(_, w)| w.has_title(title))
    }
}

impl FromIterator<(String, Window)> for WindowMap {
    fn from_iter<I: IntoIterator<Item = (String, Window)>>(iter: I) -> Self {
        let mut map = WindowMap::new();
        for (id, window) in iter {
            map.insert(id, window);
        }
        map
    }
}

#[cfg(feature = "serde")]
mod de {
    use std::fmt;

    use serde::de::{IgnoredAny, MapAccess, Visitor};
    use serde::{Deserialize, Deserializer};

    use super::{PlotContent, Window, WindowMap};

    pub(super) fn nullable_samples<'de, D>(deserializer: D) -> Result<Option<Vec<f64>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw: Option<Vec<Option<f64>>> = Option::deserialize(deserializer)?;
        Ok(raw.map(|v| v.into_iter().map(|s| s.unwrap_or(f64::NAN)).collect()))
    }

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum MaybePlot {
        Plot(PlotContent),
        Other(IgnoredAny),
    }

    pub(super) fn plot_content<'de, D>(deserializer: D) -> Result<Option<PlotContent>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Option::<MaybePlot>::deserialize(deserializer)? {
            Some(MaybePlot::Plot(content)) => Some(content),
            Some(MaybePlot::Other(_)) | None => None,
        })
    }

    struct WindowMapVisitor;

    impl<'de> Visitor<'de> for WindowMapVisitor {
        type Value = WindowMap;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            f.write_str("a map of window id to window")
        }

        fn visit_map<A>(self, mut access: A) -> Result<WindowMap, A::Error>
        where
            A: MapAccess<'de>,
        {
            let mut map = WindowMap {
                entries: Vec::with_capacity(access.size_hint().unwrap_or(0)),
            };
            while let Some((id, window)) = access.next_entry::<String, Window>()? {
                map.insert(id, window);
            }
            Ok(map)
        }
    }

    impl<'de> Deserialize<'de> for WindowMap {
        fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
        where
            D: Deserializer<'de>,
        {
            deserializer.deserialize_map(WindowMapVisitor)
        }
    }
}
