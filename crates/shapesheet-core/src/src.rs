//! Addresses of commonly used cells.
//!
//! Rows in variable sections (custom properties, hyperlinks, connection
//! points) are listed at row 0; the executor substitutes the discovered row.

use crate::address::Src;

const OBJECT: i16 = 1;
const ROW_XFORM_OUT: i16 = 1;
const ROW_LINE: i16 = 2;
const ROW_FILL: i16 = 3;

const PROPERTIES: i16 = 243;
const HYPERLINK: i16 = 244;
const CONNECTION_POINTS: i16 = 7;
const USER: i16 = 242;

// Shape transform
pub const PIN_X: Src = Src::new(OBJECT, ROW_XFORM_OUT, 0);
pub const PIN_Y: Src = Src::new(OBJECT, ROW_XFORM_OUT, 1);
pub const WIDTH: Src = Src::new(OBJECT, ROW_XFORM_OUT, 2);
pub const HEIGHT: Src = Src::new(OBJECT, ROW_XFORM_OUT, 3);
pub const LOC_PIN_X: Src = Src::new(OBJECT, ROW_XFORM_OUT, 4);
pub const LOC_PIN_Y: Src = Src::new(OBJECT, ROW_XFORM_OUT, 5);
pub const ANGLE: Src = Src::new(OBJECT, ROW_XFORM_OUT, 6);

// Line format
pub const LINE_WEIGHT: Src = Src::new(OBJECT, ROW_LINE, 0);
pub const LINE_COLOR: Src = Src::new(OBJECT, ROW_LINE, 1);
pub const LINE_PATTERN: Src = Src::new(OBJECT, ROW_LINE, 2);
pub const ROUNDING: Src = Src::new(OBJECT, ROW_LINE, 3);
pub const END_ARROW_SIZE: Src = Src::new(OBJECT, ROW_LINE, 4);
pub const LINE_BEGIN_ARROW: Src = Src::new(OBJECT, ROW_LINE, 5);
pub const LINE_END_ARROW: Src = Src::new(OBJECT, ROW_LINE, 6);
pub const LINE_CAP: Src = Src::new(OBJECT, ROW_LINE, 7);
pub const BEGIN_ARROW_SIZE: Src = Src::new(OBJECT, ROW_LINE, 8);

// Fill format
pub const FILL_FOREGND: Src = Src::new(OBJECT, ROW_FILL, 0);
pub const FILL_BKGND: Src = Src::new(OBJECT, ROW_FILL, 1);
pub const FILL_PATTERN: Src = Src::new(OBJECT, ROW_FILL, 2);

// Custom properties
pub const PROP_VALUE: Src = Src::new(PROPERTIES, 0, 0);
pub const PROP_PROMPT: Src = Src::new(PROPERTIES, 0, 1);
pub const PROP_LABEL: Src = Src::new(PROPERTIES, 0, 2);
pub const PROP_FORMAT: Src = Src::new(PROPERTIES, 0, 3);
pub const PROP_SORT_KEY: Src = Src::new(PROPERTIES, 0, 4);
pub const PROP_TYPE: Src = Src::new(PROPERTIES, 0, 5);
pub const PROP_INVISIBLE: Src = Src::new(PROPERTIES, 0, 6);
pub const PROP_ASK: Src = Src::new(PROPERTIES, 0, 7);
pub const PROP_LANG_ID: Src = Src::new(PROPERTIES, 0, 8);
pub const PROP_CALENDAR: Src = Src::new(PROPERTIES, 0, 9);

// Hyperlinks
pub const HYPERLINK_ADDRESS: Src = Src::new(HYPERLINK, 0, 0);
pub const HYPERLINK_SUB_ADDRESS: Src = Src::new(HYPERLINK, 0, 1);
pub const HYPERLINK_DESCRIPTION: Src = Src::new(HYPERLINK, 0, 2);
pub const HYPERLINK_NEW_WINDOW: Src = Src::new(HYPERLINK, 0, 3);
pub const HYPERLINK_EXTRA_INFO: Src = Src::new(HYPERLINK, 0, 4);
pub const HYPERLINK_FRAME: Src = Src::new(HYPERLINK, 0, 5);
pub const HYPERLINK_DEFAULT: Src = Src::new(HYPERLINK, 0, 6);
pub const HYPERLINK_SORT_KEY: Src = Src::new(HYPERLINK, 0, 7);
pub const HYPERLINK_INVISIBLE: Src = Src::new(HYPERLINK, 0, 8);

// Connection points
pub const CONNECTION_POINT_X: Src = Src::new(CONNECTION_POINTS, 0, 0);
pub const CONNECTION_POINT_Y: Src = Src::new(CONNECTION_POINTS, 0, 1);
pub const CONNECTION_POINT_DIR_X: Src = Src::new(CONNECTION_POINTS, 0, 2);
pub const CONNECTION_POINT_DIR_Y: Src = Src::new(CONNECTION_POINTS, 0, 3);
pub const CONNECTION_POINT_TYPE: Src = Src::new(CONNECTION_POINTS, 0, 4);

// User-defined cells
pub const USER_VALUE: Src = Src::new(USER, 0, 0);
pub const USER_PROMPT: Src = Src::new(USER, 0, 1);
