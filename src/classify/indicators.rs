use std::collections::{BTreeSet, HashSet};
use std::fmt;

/// Content signals that suggest a page is a product detail page
///
/// Detection runs once per page against the markers and words the parser
/// extracted. Markers are compacted: lower-cased with `-`, `_` and whitespace
/// removed, so `add-to-cart`, `add_to_cart` and `addToCart` are one marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Indicator {
    ProductId,
    AddToCart,
    AddToWishlist,
    BuyNow,
    ProductDetails,
    Price,
    SizeSelector,
    ColorSelector,
    Reviews,
    Mrp,
    Emi,
    PincodeCheck,
    DeliveryOptions,
    ProductSchema,
}

impl Indicator {
    /// Every indicator, in detection order
    pub fn all() -> &'static [Indicator] {
        &[
            Self::ProductId,
            Self::AddToCart,
            Self::AddToWishlist,
            Self::BuyNow,
            Self::ProductDetails,
            Self::Price,
            Self::SizeSelector,
            Self::ColorSelector,
            Self::Reviews,
            Self::Mrp,
            Self::Emi,
            Self::PincodeCheck,
            Self::DeliveryOptions,
            Self::ProductSchema,
        ]
    }

    /// Human-readable label used in logs and reports
    pub fn label(&self) -> &'static str {
        match self {
            Self::ProductId => "product id present",
            Self::AddToCart => "add-to-cart present",
            Self::AddToWishlist => "add-to-wishlist present",
            Self::BuyNow => "buy-now present",
            Self::ProductDetails => "product details present",
            Self::Price => "price present",
            Self::SizeSelector => "size selector present",
            Self::ColorSelector => "color selector present",
            Self::Reviews => "reviews present",
            Self::Mrp => "MRP present",
            Self::Emi => "EMI present",
            Self::PincodeCheck => "pincode check present",
            Self::DeliveryOptions => "delivery options present",
            Self::ProductSchema => "product schema present",
        }
    }

    /// Compacted substrings that identify this indicator in a marker
    fn marker_keys(&self) -> &'static [&'static str] {
        match self {
            Self::ProductId => &["productid", "datapid", "sku", "itemid", "variantid"],
            Self::AddToCart => &["addtocart", "addtobag"],
            Self::AddToWishlist => &["addtowishlist"],
            Self::BuyNow => &["buynow"],
            Self::ProductDetails => &[
                "productdetail",
                "productdescription",
                "producttitle",
                "itemdetail",
            ],
            Self::Price => &["productprice", "currentprice", "saleprice"],
            Self::SizeSelector => &["sizeselector"],
            Self::ColorSelector => &["colorselector", "colourselector"],
            Self::Reviews => &["productreview", "customerreview"],
            Self::Mrp => &["mrp"],
            Self::Emi => &["emioption"],
            Self::PincodeCheck => &["pincodecheck"],
            Self::DeliveryOptions => &["deliveryoption"],
            Self::ProductSchema => &[],
        }
    }

    /// Whole words of visible text that identify this indicator
    fn text_words(&self) -> &'static [&'static str] {
        match self {
            Self::Mrp => &["mrp"],
            Self::Emi => &["emi"],
            Self::PincodeCheck => &["pincode"],
            _ => &[],
        }
    }

    fn present_in<'a>(
        &self,
        markers: impl IntoIterator<Item = &'a String>,
        words: &HashSet<String>,
    ) -> bool {
        let keys = self.marker_keys();
        markers
            .into_iter()
            .any(|marker| keys.iter().any(|key| marker.contains(key)))
            || self.text_words().iter().any(|w| words.contains(*w))
    }
}

/// Compacts an attribute name, class or label into marker form
pub fn compact_marker(raw: &str) -> String {
    raw.chars()
        .filter(|c| !matches!(c, '-' | '_') && !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}

/// The distinct indicators found on one page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndicatorSet(BTreeSet<Indicator>);

impl IndicatorSet {
    /// Tests every indicator against a page's extracted facts
    ///
    /// # Arguments
    ///
    /// * `markers` - Compacted attribute names, class tokens, ids and button labels
    /// * `words` - Lower-cased words of visible text
    /// * `product_schema` - Whether structured data declares a Product
    pub fn detect(markers: &BTreeSet<String>, words: &HashSet<String>, product_schema: bool) -> Self {
        let mut found: BTreeSet<Indicator> = Indicator::all()
            .iter()
            .copied()
            .filter(|indicator| indicator.present_in(markers, words))
            .collect();
        if product_schema {
            found.insert(Indicator::ProductSchema);
        }
        Self(found)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, indicator: Indicator) -> bool {
        self.0.contains(&indicator)
    }

    pub fn iter(&self) -> impl Iterator<Item = Indicator> + '_ {
        self.0.iter().copied()
    }
}

impl FromIterator<Indicator> for IndicatorSet {
    fn from_iter<T: IntoIterator<Item = Indicator>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl fmt::Display for IndicatorSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let labels: Vec<&str> = self.0.iter().map(Indicator::label).collect();
        f.write_str(&labels.join(", "))
    }
}
