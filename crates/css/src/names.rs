use tools::define_names;

define_names! {
    /// Dense index of the CSS property names the sanitizer knows about.
    pub enum CssProperty {
        Azimuth => "azimuth",
        Background => "background",
        BackgroundAttachment => "background-attachment",
        BackgroundColor => "background-color",
        BackgroundImage => "background-image",
        BackgroundPosition => "background-position",
        BackgroundRepeat => "background-repeat",
        Behavior => "behavior",
        Border => "border",
        BorderBottom => "border-bottom",
        BorderBottomColor => "border-bottom-color",
        BorderBottomStyle => "border-bottom-style",
        BorderBottomWidth => "border-bottom-width",
        BorderCollapse => "border-collapse",
        BorderColor => "border-color",
        BorderLeft => "border-left",
        BorderLeftColor => "border-left-color",
        BorderLeftStyle => "border-left-style",
        BorderLeftWidth => "border-left-width",
        BorderRadius => "border-radius",
        BorderRight => "border-right",
        BorderRightColor => "border-right-color",
        BorderRightStyle => "border-right-style",
        BorderRightWidth => "border-right-width",
        BorderSpacing => "border-spacing",
        BorderStyle => "border-style",
        BorderTop => "border-top",
        BorderTopColor => "border-top-color",
        BorderTopStyle => "border-top-style",
        BorderTopWidth => "border-top-width",
        BorderWidth => "border-width",
        Bottom => "bottom",
        CaptionSide => "caption-side",
        Clear => "clear",
        Clip => "clip",
        Color => "color",
        Content => "content",
        CounterIncrement => "counter-increment",
        CounterReset => "counter-reset",
        Cursor => "cursor",
        Direction => "direction",
        Display => "display",
        EmptyCells => "empty-cells",
        Filter => "filter",
        Float => "float",
        Font => "font",
        FontFamily => "font-family",
        FontSize => "font-size",
        FontStretch => "font-stretch",
        FontStyle => "font-style",
        FontVariant => "font-variant",
        FontWeight => "font-weight",
        Height => "height",
        Left => "left",
        LetterSpacing => "letter-spacing",
        LineHeight => "line-height",
        ListStyle => "list-style",
        ListStyleImage => "list-style-image",
        ListStylePosition => "list-style-position",
        ListStyleType => "list-style-type",
        Margin => "margin",
        MarginBottom => "margin-bottom",
        MarginLeft => "margin-left",
        MarginRight => "margin-right",
        MarginTop => "margin-top",
        MaxHeight => "max-height",
        MaxWidth => "max-width",
        MinHeight => "min-height",
        MinWidth => "min-width",
        MozBinding => "-moz-binding",
        Opacity => "opacity",
        Outline => "outline",
        OutlineColor => "outline-color",
        OutlineStyle => "outline-style",
        OutlineWidth => "outline-width",
        Overflow => "overflow",
        OverflowX => "overflow-x",
        OverflowY => "overflow-y",
        Padding => "padding",
        PaddingBottom => "padding-bottom",
        PaddingLeft => "padding-left",
        PaddingRight => "padding-right",
        PaddingTop => "padding-top",
        PageBreakAfter => "page-break-after",
        PageBreakBefore => "page-break-before",
        PageBreakInside => "page-break-inside",
        Position => "position",
        Quotes => "quotes",
        Right => "right",
        TableLayout => "table-layout",
        TextAlign => "text-align",
        TextDecoration => "text-decoration",
        TextIndent => "text-indent",
        TextTransform => "text-transform",
        Top => "top",
        UnicodeBidi => "unicode-bidi",
        VerticalAlign => "vertical-align",
        Visibility => "visibility",
        WhiteSpace => "white-space",
        Width => "width",
        WordSpacing => "word-spacing",
        WordWrap => "word-wrap",
        ZIndex => "z-index",
        Zoom => "zoom",
    }
}
