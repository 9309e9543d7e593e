//! Named colour palettes

/// Colours and fonts of a rendered chart
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Style {
    /// Name used in views
    pub name: &'static str,
    /// Canvas background
    pub background: &'static str,
    /// Plot area background
    pub plot_background: &'static str,
    /// Labels and legend text
    pub foreground: &'static str,
    /// Title text
    pub foreground_strong: &'static str,
    /// Grid lines and axis guides
    pub foreground_subtle: &'static str,
    /// Series colours, cycled when there are more series than colours
    pub colors: &'static [&'static str],
    /// Font family
    pub font_family: &'static str,
}

impl Style {
    /// Colour of the `index`-th series
    pub fn color(&self, index: usize) -> &'static str {
        self.colors[index % self.colors.len()]
    }

    /// Look up a named palette
    pub fn by_name(name: &str) -> Option<&'static Style> {
        STYLES.iter().find(|style| style.name == name)
    }

    /// Names of all palettes usable from a view
    pub fn names() -> impl Iterator<Item = &'static str> {
        STYLES.iter().map(|style| style.name)
    }
}

const SANS: &str = "Consolas, \"Liberation Mono\", Menlo, Courier, monospace";

const SOLARIZED: &[&str] = &[
    "#b58900", "#cb4b16", "#dc322f", "#d33682", "#6c71c4", "#268bd2", "#2aa198", "#859900",
];

const DARK: &[&str] = &[
    "#ff5995", "#b6e354", "#feed6c", "#8cedff", "#9e6ffe", "#899ca1", "#f8f8f2", "#bf4646",
    "#516083", "#f92672", "#82b414", "#fd971f", "#56c2d6", "#808384", "#8c54fe", "#465457",
];

/// Palette used when a view names none
pub static DEFAULT_STYLE: Style = Style {
    name: "default",
    background: "rgba(249, 249, 249, 1)",
    plot_background: "rgba(255, 255, 255, 1)",
    foreground: "rgba(0, 0, 0, .87)",
    foreground_strong: "rgba(0, 0, 0, 1)",
    foreground_subtle: "rgba(0, 0, 0, .54)",
    colors: &[
        "#F44336", "#3F51B5", "#009688", "#FFC107", "#FF5722", "#9C27B0", "#03A9F4", "#8BC34A",
        "#FF9800", "#E91E63", "#2196F3", "#4CAF50", "#FFEB3B", "#673AB7", "#00BCD4", "#CDDC39",
    ],
    font_family: SANS,
};

static STYLES: [Style; 14] = [
    Style {
        name: "dark",
        background: "black",
        plot_background: "#111",
        foreground: "#999",
        foreground_strong: "#eee",
        foreground_subtle: "#555",
        colors: DARK,
        font_family: SANS,
    },
    Style {
        name: "neon",
        background: "black",
        plot_background: "#111",
        foreground: "#999",
        foreground_strong: "#eee",
        foreground_subtle: "#555",
        colors: &[
            "#ff0090", "#00ffc8", "#fffc00", "#00c3ff", "#b300ff", "#ff4e00", "#8cff00", "#ff008c",
        ],
        font_family: SANS,
    },
    Style {
        name: "dark-solarized",
        background: "#073642",
        plot_background: "#002b36",
        foreground: "#839496",
        foreground_strong: "#fdf6e3",
        foreground_subtle: "#657b83",
        colors: SOLARIZED,
        font_family: SANS,
    },
    Style {
        name: "light-solarized",
        background: "#fdf6e3",
        plot_background: "#eee8d5",
        foreground: "#657b83",
        foreground_strong: "#073642",
        foreground_subtle: "#073642",
        colors: SOLARIZED,
        font_family: SANS,
    },
    Style {
        name: "light",
        background: "white",
        plot_background: "rgba(0, 0, 255, 0.1)",
        foreground: "rgba(0, 0, 0, 0.7)",
        foreground_strong: "rgba(0, 0, 0, 0.9)",
        foreground_subtle: "rgba(0, 0, 0, 0.5)",
        colors: &[
            "#242424", "#9f6767", "#92ac68", "#d0d293", "#9aacc3", "#bb77a4", "#77bbb5", "#777777",
        ],
        font_family: SANS,
    },
    Style {
        name: "clean",
        background: "transparent",
        plot_background: "rgba(240, 240, 240, 0.7)",
        foreground: "rgba(0, 0, 0, 0.9)",
        foreground_strong: "rgba(0, 0, 0, 0.9)",
        foreground_subtle: "rgba(0, 0, 0, 0.5)",
        colors: &[
            "rgb(12,55,149)",
            "rgb(117,38,65)",
            "rgb(228,127,0)",
            "rgb(159,170,0)",
            "rgb(149,12,12)",
        ],
        font_family: SANS,
    },
    Style {
        name: "red-blue",
        background: "#f9f9fa",
        plot_background: "#ffffff",
        foreground: "rgba(0, 0, 0, 0.9)",
        foreground_strong: "rgba(0, 0, 0, 0.9)",
        foreground_subtle: "rgba(0, 0, 0, 0.5)",
        colors: &[
            "#d94e4c", "#e5884f", "#39929a", "#e27876", "#245d62", "#f0bb9b", "#c82d2a", "#234547",
        ],
        font_family: SANS,
    },
    Style {
        name: "dark-colorized",
        background: "#3a2d3f",
        plot_background: "rgba(0, 0, 0, 0)",
        foreground: "rgba(255, 255, 255, 0.9)",
        foreground_strong: "rgba(255, 255, 255, 0.9)",
        foreground_subtle: "rgba(255, 255, 255, 0.5)",
        colors: &[
            "#c900fe", "#01b8fe", "#59f500", "#ff00e4", "#f9fa00", "#780098", "#0181b2", "#348f00",
        ],
        font_family: SANS,
    },
    Style {
        name: "light-colorized",
        background: "#f8f8f8",
        plot_background: "#ffffff",
        foreground: "#333",
        foreground_strong: "#666",
        foreground_subtle: "rgba(0, 0, 0, 0.5)",
        colors: &[
            "#fe9592", "#534f4c", "#3ac2c0", "#a2a7a1", "#fd4b46", "#7b7571", "#73d5d4", "#c9ccc9",
        ],
        font_family: SANS,
    },
    Style {
        name: "turquoise",
        background: "#0e4448",
        plot_background: "#0b3538",
        foreground: "#99ccc9",
        foreground_strong: "#ffffff",
        foreground_subtle: "#1a8f88",
        colors: &[
            "#93d2d9", "#ef940f", "#8c6243", "#fff", "#5ca7ae", "#b77c0b", "#c98d5f", "#cccccc",
        ],
        font_family: SANS,
    },
    Style {
        name: "light-green",
        background: "#fbfbfb",
        plot_background: "#fff",
        foreground: "#333333",
        foreground_strong: "#666",
        foreground_subtle: "#222222",
        colors: &[
            "#7dcf30", "#247fab", "#a6e06e", "#3da5d8", "#5ea91f", "#1a5c7c", "#cdef9e", "#8fc7ea",
        ],
        font_family: SANS,
    },
    Style {
        name: "dark-green",
        background: "#161201",
        plot_background: "#0a0800",
        foreground: "rgba(255, 255, 255, 0.9)",
        foreground_strong: "rgba(255, 255, 255, 0.9)",
        foreground_subtle: "rgba(255, 255, 255, 0.6)",
        colors: &[
            "#adde09", "#6e8c06", "#4a5e04", "#fcd202", "#c1e34d", "#fee980", "#7a9a07", "#b09301",
        ],
        font_family: SANS,
    },
    Style {
        name: "dark-green-blue",
        background: "#000",
        plot_background: "#141414",
        foreground: "rgba(255, 255, 255, 0.9)",
        foreground_strong: "rgba(255, 255, 255, 0.9)",
        foreground_subtle: "rgba(255, 255, 255, 0.6)",
        colors: &[
            "#7ed2fa", "#7dcf30", "#247fab", "#64a626", "#3da5d8", "#5ea91f", "#1a5c7c", "#a6e06e",
        ],
        font_family: SANS,
    },
    Style {
        name: "blue",
        background: "#f0f0f0",
        plot_background: "#f8f8f8",
        foreground: "rgba(0, 0, 0, 0.9)",
        foreground_strong: "rgba(0, 0, 0, 0.9)",
        foreground_subtle: "rgba(0, 0, 0, 0.6)",
        colors: &[
            "#00b2f0", "#43d9be", "#0662ab", "#00668a", "#98eadb", "#97d959", "#033861", "#ffd541",
        ],
        font_family: SANS,
    },
];
