//! Page layout calculations for image pages

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Simple length type in millimeters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Length(pub f64);

impl Length {
    /// Create a length from millimeters
    pub fn from_mm(mm: f64) -> Self {
        Length(mm)
    }

    /// Create a length from inches
    pub fn from_inches(inches: f64) -> Self {
        Length(inches * 25.4)
    }

    /// Create a length from points (1/72 inch)
    pub fn from_pt(pt: f64) -> Self {
        Length(pt * 25.4 / 72.0)
    }

    /// Get the value in millimeters
    pub fn mm(&self) -> f64 {
        self.0
    }

    /// Get the value in points (1/72 inch)
    pub fn pt(&self) -> f64 {
        self.0 * 72.0 / 25.4
    }
}

/// Page dimensions
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageDimensions {
    pub width: Length,
    pub height: Length,
}

impl PageDimensions {
    /// US Letter size (8.5" × 11")
    pub fn letter() -> Self {
        Self {
            width: Length::from_mm(215.9),
            height: Length::from_mm(279.4),
        }
    }

    /// A4 size (210mm × 297mm)
    pub fn a4() -> Self {
        Self {
            width: Length::from_mm(210.0),
            height: Length::from_mm(297.0),
        }
    }

    /// Same page turned on its side
    pub fn landscape(self) -> Self {
        Self {
            width: self.height,
            height: self.width,
        }
    }

    /// Portrait for tall content, landscape for wide content
    pub fn oriented_for(self, content_width: f64, content_height: f64) -> Self {
        let portrait = self.width.mm() <= self.height.mm();
        let wide = content_width > content_height;
        if portrait == wide {
            self.landscape()
        } else {
            self
        }
    }
}

/// Margins for page content
#[derive(Debug, Clone, Copy)]
pub struct Margins {
    pub top: Length,
    pub bottom: Length,
    pub left: Length,
    pub right: Length,
}

impl Margins {
    /// Create margins with same value on all sides
    pub fn uniform(margin: Length) -> Self {
        Self {
            top: margin,
            bottom: margin,
            left: margin,
            right: margin,
        }
    }
}

/// Paper size used for image pages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageSize {
    /// Page matches the image, one pixel per point
    #[default]
    Fit,
    A4,
    Letter,
}

impl PageSize {
    fn dimensions(self) -> Option<PageDimensions> {
        match self {
            PageSize::Fit => None,
            PageSize::A4 => Some(PageDimensions::a4()),
            PageSize::Letter => Some(PageDimensions::letter()),
        }
    }
}

impl FromStr for PageSize {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fit" => Ok(PageSize::Fit),
            "a4" => Ok(PageSize::A4),
            "letter" => Ok(PageSize::Letter),
            other => Err(format!("unknown page size '{}' (expected fit, a4 or letter)", other)),
        }
    }
}

impl fmt::Display for PageSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PageSize::Fit => "fit",
            PageSize::A4 => "a4",
            PageSize::Letter => "letter",
        };
        f.write_str(name)
    }
}

/// Where an image lands on its page, in points with origin at bottom-left
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub page_width: f64,
    pub page_height: f64,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// How image pages are sized
#[derive(Debug, Clone, Copy)]
pub struct PagePlacement {
    pub size: PageSize,
    /// Ignored for `PageSize::Fit`
    pub margins: Margins,
}

impl Default for PagePlacement {
    fn default() -> Self {
        Self {
            size: PageSize::Fit,
            margins: Margins::uniform(Length::from_mm(10.0)),
        }
    }
}

impl PagePlacement {
    /// Compute page size and image rectangle for an image of the given pixel size
    pub fn place(&self, image_width: u32, image_height: u32) -> Placement {
        let iw = f64::from(image_width.max(1));
        let ih = f64::from(image_height.max(1));

        let page = match self.size.dimensions() {
            None => {
                return Placement {
                    page_width: iw,
                    page_height: ih,
                    x: 0.0,
                    y: 0.0,
                    width: iw,
                    height: ih,
                };
            }
            Some(page) => page.oriented_for(iw, ih),
        };

        let page_width = page.width.pt();
        let page_height = page.height.pt();
        let avail_w = (page_width - self.margins.left.pt() - self.margins.right.pt()).max(1.0);
        let avail_h = (page_height - self.margins.top.pt() - self.margins.bottom.pt()).max(1.0);

        let scale = (avail_w / iw).min(avail_h / ih);
        let width = iw * scale;
        let height = ih * scale;

        Placement {
            page_width,
            page_height,
            x: self.margins.left.pt() + (avail_w - width) / 2.0,
            y: self.margins.bottom.pt() + (avail_h - height) / 2.0,
            width,
            height,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_length_conversions() {
        let len = Length::from_inches(1.0);
        assert!((len.mm() - 25.4).abs() < 0.01);
        assert!((len.pt() - 72.0).abs() < 0.01);
        assert!((Length::from_pt(72.0).mm() - 25.4).abs() < 0.01);
    }

    #[test]
    fn test_letter_size() {
        let letter = PageDimensions::letter();
        // 8.5 inches = 215.9 mm
        assert!((letter.width.mm() - 215.9).abs() < 0.1);
        // 11 inches = 279.4 mm
        assert!((letter.height.mm() - 279.4).abs() < 0.1);
    }

    #[test]
    fn test_oriented_for_wide_content() {
        let page = PageDimensions::a4().oriented_for(400.0, 300.0);
        assert_eq!(page.width.mm(), 297.0);
        assert_eq!(page.height.mm(), 210.0);

        let page = PageDimensions::a4().oriented_for(300.0, 400.0);
        assert_eq!(page.width.mm(), 210.0);
    }

    #[test]
    fn test_fit_placement_uses_pixels_as_points() {
        let placement = PagePlacement::default().place(640, 480);
        assert_eq!(placement.page_width, 640.0);
        assert_eq!(placement.page_height, 480.0);
        assert_eq!(placement.x, 0.0);
        assert_eq!(placement.width, 640.0);
    }

    #[test]
    fn test_a4_placement_is_centered_and_scaled() {
        let placement = PagePlacement {
            size: PageSize::A4,
            margins: Margins::uniform(Length::from_mm(10.0)),
        }
        .place(1000, 2000);

        let margin = Length::from_mm(10.0).pt();
        // Tall image is limited by the page height
        assert!((placement.height - (placement.page_height - 2.0 * margin)).abs() < 0.01);
        assert!((placement.width * 2.0 - placement.height).abs() < 0.01);
        // Horizontal centering
        let right_gap = placement.page_width - placement.x - placement.width;
        assert!((placement.x - right_gap).abs() < 0.01);
    }

    #[test]
    fn test_page_size_parsing() {
        assert_eq!("A4".parse::<PageSize>().unwrap(), PageSize::A4);
        assert_eq!(" letter ".parse::<PageSize>().unwrap(), PageSize::Letter);
        assert!("tabloid".parse::<PageSize>().is_err());
        assert_eq!(PageSize::Fit.to_string(), "fit");
    }
}
