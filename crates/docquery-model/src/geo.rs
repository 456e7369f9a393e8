//! Geo shapes accepted by the spatial query operators.
//!
//! Two families exist on the wire:
//!
//! - **legacy** coordinate shapes (`[x, y]` pairs, `$box`, `$center`,
//!   `$centerSphere`, `$polygon`), rendered inline;
//! - **GeoJSON** geometries (`{type, coordinates}`), which operators must wrap
//!   under a `$geometry` key.
//!
//! [`Shape::is_geo_json`] is the switch the criteria compiler uses to decide
//! whether that wrapping applies.

use std::hash::{Hash, Hasher};

use crate::document::Document;
use crate::value::Value;

/// A two-dimensional point (`x` is longitude for spherical data).
#[derive(Debug, Clone, Copy)]
pub struct Point {
    /// Horizontal coordinate.
    pub x: f64,
    /// Vertical coordinate.
    pub y: f64,
}

impl Point {
    /// Create a point.
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Render as a legacy coordinate pair.
    #[must_use]
    pub fn to_value(&self) -> Value {
        Value::Array(vec![Value::Double(self.x), Value::Double(self.y)])
    }
}

impl PartialEq for Point {
    fn eq(&self, other: &Self) -> bool {
        self.x.to_bits() == other.x.to_bits() && self.y.to_bits() == other.y.to_bits()
    }
}

impl Eq for Point {}

impl Hash for Point {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.x.to_bits().hash(state);
        self.y.to_bits().hash(state);
    }
}

/// An axis-aligned rectangle given by two opposite corners.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GeoBox {
    /// Lower-left corner.
    pub first: Point,
    /// Upper-right corner.
    pub second: Point,
}

impl GeoBox {
    /// Create a box from two corners.
    #[must_use]
    pub fn new(first: Point, second: Point) -> Self {
        Self { first, second }
    }
}

/// A circle with a center and radius.
#[derive(Debug, Clone, Copy)]
pub struct Circle {
    /// Center point.
    pub center: Point,
    /// Radius in coordinate units (radians when used as a sphere).
    pub radius: f64,
}

impl Circle {
    /// Create a circle.
    #[must_use]
    pub fn new(center: Point, radius: f64) -> Self {
        Self { center, radius }
    }

    fn to_value(self) -> Value {
        Value::Array(vec![self.center.to_value(), Value::Double(self.radius)])
    }
}

impl PartialEq for Circle {
    fn eq(&self, other: &Self) -> bool {
        self.center == other.center && self.radius.to_bits() == other.radius.to_bits()
    }
}

impl Eq for Circle {}

impl Hash for Circle {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.center.hash(state);
        self.radius.to_bits().hash(state);
    }
}

/// A legacy polygon as an open list of vertices.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Polygon {
    /// Vertices in order.
    pub points: Vec<Point>,
}

impl Polygon {
    /// Create a polygon from its vertices.
    #[must_use]
    pub fn new(points: Vec<Point>) -> Self {
        Self { points }
    }
}

/// A GeoJSON geometry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum GeoJson {
    /// `Point`.
    Point(Point),
    /// `MultiPoint`.
    MultiPoint(Vec<Point>),
    /// `LineString`.
    LineString(Vec<Point>),
    /// `MultiLineString`.
    MultiLineString(Vec<Vec<Point>>),
    /// `Polygon` as a list of linear rings (first is the outer ring).
    Polygon(Vec<Vec<Point>>),
    /// `MultiPolygon`.
    MultiPolygon(Vec<Vec<Vec<Point>>>),
    /// `GeometryCollection`.
    GeometryCollection(Vec<GeoJson>),
}

impl GeoJson {
    /// The GeoJSON `type` member.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Point(_) => "Point",
            Self::MultiPoint(_) => "MultiPoint",
            Self::LineString(_) => "LineString",
            Self::MultiLineString(_) => "MultiLineString",
            Self::Polygon(_) => "Polygon",
            Self::MultiPolygon(_) => "MultiPolygon",
            Self::GeometryCollection(_) => "GeometryCollection",
        }
    }

    /// Render as a `{type, coordinates}` document (`geometries` for collections).
    #[must_use]
    pub fn to_document(&self) -> Document {
        let doc = Document::single("type", self.kind());
        match self {
            Self::Point(p) => doc.with("coordinates", p.to_value()),
            Self::MultiPoint(points) | Self::LineString(points) => {
                doc.with("coordinates", points_value(points))
            }
            Self::MultiLineString(rings) | Self::Polygon(rings) => doc.with(
                "coordinates",
                Value::Array(rings.iter().map(|r| points_value(r)).collect()),
            ),
            Self::MultiPolygon(polygons) => doc.with(
                "coordinates",
                Value::Array(
                    polygons
                        .iter()
                        .map(|rings| Value::Array(rings.iter().map(|r| points_value(r)).collect()))
                        .collect(),
                ),
            ),
            Self::GeometryCollection(geometries) => doc.with(
                "geometries",
                Value::Array(
                    geometries
                        .iter()
                        .map(|g| Value::Document(g.to_document()))
                        .collect(),
                ),
            ),
        }
    }

    /// Render wrapped under `$geometry`, the form spatial operators expect.
    #[must_use]
    pub fn to_geometry(&self) -> Document {
        Document::single("$geometry", self.to_document())
    }
}

fn points_value(points: &[Point]) -> Value {
    Value::Array(points.iter().map(Point::to_value).collect())
}

/// Any shape a spatial operator accepts.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Shape {
    /// Legacy coordinate pair.
    Point(Point),
    /// Legacy rectangle (`$box`).
    Box(GeoBox),
    /// Legacy flat circle (`$center`).
    Circle(Circle),
    /// Spherical circle (`$centerSphere`), radius in radians.
    Sphere(Circle),
    /// Legacy polygon (`$polygon`).
    Polygon(Polygon),
    /// GeoJSON geometry.
    GeoJson(GeoJson),
}

impl Shape {
    /// Returns `true` for GeoJSON geometries, which need `$geometry` wrapping.
    #[must_use]
    pub fn is_geo_json(&self) -> bool {
        matches!(self, Self::GeoJson(_))
    }

    /// Render as a bare operand, e.g. the value of `$near`.
    ///
    /// Legacy points become coordinate pairs, other legacy shapes use their
    /// command form, GeoJSON renders unwrapped.
    #[must_use]
    pub fn to_value(&self) -> Value {
        match self {
            Self::Point(p) => p.to_value(),
            Self::GeoJson(g) => Value::Document(g.to_document()),
            _ => self.to_command_value(),
        }
    }

    /// Render as the argument of `$geoWithin` (`{$box: ...}`, `{$center: ...}`).
    #[must_use]
    pub fn to_command_value(&self) -> Value {
        let doc = match self {
            Self::Point(p) => return p.to_value(),
            Self::GeoJson(g) => g.to_document(),
            Self::Box(b) => Document::single(
                "$box",
                Value::Array(vec![b.first.to_value(), b.second.to_value()]),
            ),
            Self::Circle(c) => Document::single("$center", c.to_value()),
            Self::Sphere(c) => Document::single("$centerSphere", c.to_value()),
            Self::Polygon(p) => Document::single("$polygon", points_value(&p.points)),
        };
        Value::Document(doc)
    }
}

impl From<Point> for Shape {
    fn from(p: Point) -> Self {
        Self::Point(p)
    }
}

impl From<GeoBox> for Shape {
    fn from(b: GeoBox) -> Self {
        Self::Box(b)
    }
}

impl From<Circle> for Shape {
    fn from(c: Circle) -> Self {
        Self::Circle(c)
    }
}

impl From<Polygon> for Shape {
    fn from(p: Polygon) -> Self {
        Self::Polygon(p)
    }
}

impl From<GeoJson> for Shape {
    fn from(g: GeoJson) -> Self {
        Self::GeoJson(g)
    }
}
