//! Shared read-only enum and flag name tables.
//!
//! Many decoder entries reference the same table (the `{None, PointerRoot,
//! Parent}` trio alone serves four requests); each table is held once and
//! borrowed everywhere it applies.

// BITGRAVITY
pub static BITGRAVITY: &[&str] = &[
    "Forget",     //  0
    "NorthWest",  //  1
    "North",      //  2
    "NorthEast",  //  3
    "West",       //  4
    "Center",     //  5
    "East",       //  6
    "SouthWest",  //  7
    "South",      //  8
    "SouthEast",  //  9
    "Static",     // 10
];

// WINGRAVITY
pub static WINGRAVITY: &[&str] = &[
    "Unmap",      //  0
    "NorthWest",  //  1
    "North",      //  2
    "NorthEast",  //  3
    "West",       //  4
    "Center",     //  5
    "East",       //  6
    "SouthWest",  //  7
    "South",      //  8
    "SouthEast",  //  9
    "Static",     // 10
];

// BOOL
pub static BOOL: &[&str] = &["False", "True"];

// SETofEVENT, SETofPOINTEREVENT, SETofDEVICEEVENT flag names
pub static SET_OF_EVENT: &[&str] = &[
    "KeyPress",              // 1 <<  0
    "KeyRelease",            // 1 <<  1
    "ButtonPress",           // 1 <<  2
    "ButtonRelease",         // 1 <<  3
    "EnterWindow",           // 1 <<  4
    "LeaveWindow",           // 1 <<  5
    "PointerMotion",         // 1 <<  6
    "PointerMotionHint",     // 1 <<  7
    "Button1Motion",         // 1 <<  8
    "Button2Motion",         // 1 <<  9
    "Button3Motion",         // 1 << 10
    "Button4Motion",         // 1 << 11
    "Button5Motion",         // 1 << 12
    "ButtonMotion",          // 1 << 13
    "KeymapState",           // 1 << 14
    "Exposure",              // 1 << 15
    "VisibilityChange",      // 1 << 16
    "StructureNotify",       // 1 << 17
    "ResizeRedirect",        // 1 << 18
    "SubstructureNotify",    // 1 << 19
    "SubstructureRedirect",  // 1 << 20
    "FocusChange",           // 1 << 21
    "PropertyChange",        // 1 << 22
    "ColormapChange",        // 1 << 23
    "OwnerGrabButton",       // 1 << 24
];

// SETofKEYBUTMASK and SETofKEYMASK flag names
pub static SET_OF_KEYBUTMASK: &[&str] = &[
    "Shift",    // 1 <<  0
    "Lock",     // 1 <<  1
    "Control",  // 1 <<  2
    "Mod1",     // 1 <<  3
    "Mod2",     // 1 <<  4
    "Mod3",     // 1 <<  5
    "Mod4",     // 1 <<  6
    "Mod5",     // 1 <<  7
    "Button1",  // 1 <<  8
    "Button2",  // 1 <<  9
    "Button3",  // 1 << 10
    "Button4",  // 1 << 11
    "Button5",  // 1 << 12
];

pub static ANY_MODIFIER: &str = "AnyModifier"; // SETofKEYMASK 0x8000

// HOST.family; values 3 and 4 are unassigned
pub static HOST_FAMILY: &[&str] = &[
    "Internet",           // 0
    "DECnet",             // 1
    "Chaos",              // 2
    "",
    "",
    "ServerInterpreted",  // 5
    "InternetV6",         // 6
];

// setup image-byte-order
pub static IMAGE_BYTE_ORDER: &[&str] = &["LSBFirst", "MSBFirst"];

// setup bitmap-format-bit-order
pub static BITMAP_FORMAT_BIT_ORDER: &[&str] = &["LeastSignificant", "MostSignificant"];

// SCREEN.backing-stores
pub static SCREEN_BACKING_STORES: &[&str] = &["Never", "WhenMapped", "Always"];

// VISUALTYPE.class
pub static VISUALTYPE_CLASS: &[&str] = &[
    "StaticGray",   // 0
    "GrayScale",    // 1
    "StaticColor",  // 2
    "PseudoColor",  // 3
    "TrueColor",    // 4
    "DirectColor",  // 5
];

// CreateWindow.class, GetWindowAttributes reply class
pub static WINDOW_CLASS: &[&str] = &["CopyFromParent", "InputOutput", "InputOnly"];

// resource fields where 0 reads CopyFromParent
pub static ZERO_COPY_FROM_PARENT: &[&str] = &["CopyFromParent"];

// resource fields where 0 reads None
pub static ZERO_NONE: &[&str] = &["None"];

// CreateWindow/ChangeWindowAttributes value-mask
pub static WINDOW_ATTRIBUTE_VALUE_MASK: &[&str] = &[
    "background-pixmap",      // 1 <<  0
    "background-pixel",       // 1 <<  1
    "border-pixmap",          // 1 <<  2
    "border-pixel",           // 1 <<  3
    "bit-gravity",            // 1 <<  4
    "win-gravity",            // 1 <<  5
    "backing-store",          // 1 <<  6
    "backing-planes",         // 1 <<  7
    "backing-pixel",          // 1 <<  8
    "override-redirect",      // 1 <<  9
    "save-under",             // 1 << 10
    "event-mask",             // 1 << 11
    "do-not-propagate-mask",  // 1 << 12
    "colormap",               // 1 << 13
    "cursor",                 // 1 << 14
];

// window attribute VALUE.background-pixmap
pub static WINDOW_ATTRIBUTE_BACKGROUND_PIXMAP: &[&str] = &["None", "ParentRelative"];

// window attribute VALUE.backing-store
pub static WINDOW_ATTRIBUTE_BACKING_STORE: &[&str] = &["NotUseful", "WhenMapped", "Always"];

// GetWindowAttributes reply map-state
pub static WINDOW_ATTRIBUTE_MAP_STATE: &[&str] = &["Unmapped", "Unviewable", "Viewable"];

// ChangeSaveSet.mode, ChangeHosts.mode
pub static INSERT_DELETE_MODE: &[&str] = &["Insert", "Delete"];

// ConfigureWindow.value-mask, ConfigureRequest.value-mask
pub static WINDOW_VALUE_MASK: &[&str] = &[
    "x",             // 1 << 0
    "y",             // 1 << 1
    "width",         // 1 << 2
    "height",        // 1 << 3
    "border-width",  // 1 << 4
    "sibling",       // 1 << 5
    "stack-mode",    // 1 << 6
];

// ConfigureWindow VALUE.stack-mode
pub static WINDOW_VALUE_STACK_MODE: &[&str] = &["Above", "Below", "TopIf", "BottomIf", "Opposite"];

// CirculateWindow.direction
pub static CIRCULATE_DIRECTION: &[&str] = &["RaiseLowest", "LowerHighest"];

// ChangeProperty.mode
pub static CHANGE_PROPERTY_MODE: &[&str] = &["Replace", "Prepend", "Append"];

// GetProperty.type
pub static PROPERTY_ATOM: &[&str] = &["AnyPropertyType"];

// SendEvent.destination
pub static EVENT_DESTINATION: &[&str] = &["PointerWindow", "InputFocus"];

// GrabButton.button
pub static BUTTON: &[&str] = &["AnyButton"];

// GrabPointer/GrabKeyboard reply status
pub static GRAB_STATUS: &[&str] = &[
    "Success",         // 0
    "AlreadyGrabbed",  // 1
    "InvalidTime",     // 2
    "NotViewable",     // 3
    "Frozen",          // 4
];

// pointer-mode/keyboard-mode of the grab requests
pub static INPUT_MODE: &[&str] = &["Synchronous", "Asynchronous"];

// GrabKey/UngrabKey.key
pub static KEY: &[&str] = &["AnyKey"];

// AllowEvents.mode
pub static EVENTS_MODE: &[&str] = &[
    "AsyncPointer",    // 0
    "SyncPointer",     // 1
    "ReplayPointer",   // 2
    "AsyncKeyboard",   // 3
    "SyncKeyboard",    // 4
    "ReplayKeyboard",  // 5
    "AsyncBoth",       // 6
    "SyncBoth",        // 7
];

// TIMESTAMP sentinel
pub static TIME: &[&str] = &["CurrentTime"];

// SetInputFocus.revert-to and focus fields
pub static INPUT_FOCUS: &[&str] = &["None", "PointerRoot", "Parent"];

// QueryFont/QueryTextExtents/ListFontsWithInfo draw-direction
pub static DRAW_DIRECTION: &[&str] = &["LeftToRight", "RightToLeft"];

// CreateGC/ChangeGC/CopyGC value-mask
pub static GC_VALUE_MASK: &[&str] = &[
    "function",               // 1 <<  0
    "plane-mask",             // 1 <<  1
    "foreground",             // 1 <<  2
    "background",             // 1 <<  3
    "line-width",             // 1 <<  4
    "line-style",             // 1 <<  5
    "cap-style",              // 1 <<  6
    "join-style",             // 1 <<  7
    "fill-style",             // 1 <<  8
    "fill-rule",              // 1 <<  9
    "tile",                   // 1 << 10
    "stipple",                // 1 << 11
    "tile-stipple-x-origin",  // 1 << 12
    "tile-stipple-y-origin",  // 1 << 13
    "font",                   // 1 << 14
    "subwindow-mode",         // 1 << 15
    "graphics-exposures",     // 1 << 16
    "clip-x-origin",          // 1 << 17
    "clip-y-origin",          // 1 << 18
    "clip-mask",              // 1 << 19
    "dash-offset",            // 1 << 20
    "dashes",                 // 1 << 21
    "arc-mode",               // 1 << 22
];

// GC VALUE.function
pub static GC_VALUE_FUNCTION: &[&str] = &[
    "Clear",         //  0
    "And",           //  1
    "AndReverse",    //  2
    "Copy",          //  3
    "AndInverted",   //  4
    "NoOp",          //  5
    "Xor",           //  6
    "Or",            //  7
    "Nor",           //  8
    "Equiv",         //  9
    "Invert",        // 10
    "OrReverse",     // 11
    "CopyInverted",  // 12
    "OrInverted",    // 13
    "Nand",          // 14
    "Set",           // 15
];

pub static GC_VALUE_LINE_STYLE: &[&str] = &["Solid", "OnOffDash", "DoubleDash"];
pub static GC_VALUE_CAP_STYLE: &[&str] = &["NotLast", "Butt", "Round", "Projecting"];
pub static GC_VALUE_JOIN_STYLE: &[&str] = &["Miter", "Round", "Bevel"];
pub static GC_VALUE_FILL_STYLE: &[&str] = &["Solid", "Tiled", "Stippled", "OpaqueStippled"];
pub static GC_VALUE_FILL_RULE: &[&str] = &["EvenOdd", "Winding"];
pub static GC_VALUE_SUBWINDOW_MODE: &[&str] = &["ClipByChildren", "IncludeInferiors"];
pub static GC_VALUE_ARC_MODE: &[&str] = &["Chord", "PieSlice"];

// SetClipRectangles.ordering
pub static CLIP_RECT_ORDERING: &[&str] = &["UnSorted", "YSorted", "YXSorted", "YXBanded"];

// FillPoly.shape
pub static POLY_SHAPE: &[&str] = &["Complex", "Nonconvex", "Convex"];

// PolyPoint/PolyLine/FillPoly coordinate-mode
pub static POLY_COORDINATE_MODE: &[&str] = &["Origin", "Previous"];

// PutImage/GetImage.format
pub static IMAGE_FORMAT: &[&str] = &["Bitmap", "XYPixmap", "ZPixmap"];

// CreateColormap.alloc
pub static COLORMAP_ALLOC: &[&str] = &["None", "All"];

// StoreColors COLORITEM do-red/do-green/do-blue flags
pub static DO_RGB_MASK: &[&str] = &["do-red", "do-green", "do-blue"];

// QueryBestSize.class
pub static SIZE_CLASS: &[&str] = &["Cursor", "Tile", "Stipple"];

// ChangeKeyboardControl.value-mask
pub static KEYCTL_VALUE_MASK: &[&str] = &[
    "key-click-percent",  // 1 << 0
    "bell-percent",       // 1 << 1
    "bell-pitch",         // 1 << 2
    "bell-duration",      // 1 << 3
    "led",                // 1 << 4
    "led-mode",           // 1 << 5
    "key",                // 1 << 6
    "auto-repeat-mode",   // 1 << 7
];

// led-mode, auto-repeat-mode, global-auto-repeat
pub static OFF_ON: &[&str] = &["Off", "On"];

// SetScreenSaver prefer-blanking/allow-exposures
pub static SCREEN_SAVER: &[&str] = &["No", "Yes", "Default"];

// ListHosts reply mode
pub static HOST_STATUS_MODE: &[&str] = &["Disabled", "Enabled"];

// SetAccessControl.mode
pub static ACCESS_MODE: &[&str] = &["Disable", "Enable"];

// SetCloseDownMode.mode
pub static CLOSE_DOWN_MODE: &[&str] = &["Destroy", "RetainPermanent", "RetainTemporary"];

// KillClient.resource
pub static CLIENT_RESOURCE: &[&str] = &["AllTemporary"];

// ForceScreenSaver.mode
pub static SCREEN_SAVER_SET_MODE: &[&str] = &["Reset", "Activate"];

// SetPointerMapping/SetModifierMapping reply status
pub static MAPPING_STATUS: &[&str] = &["Success", "Busy", "Failed"];

// MotionNotify.detail
pub static MOTION_HINT: &[&str] = &["Normal", "Hint"];

// EnterNotify/LeaveNotify/FocusIn/FocusOut.mode
pub static FOCUS_MODE: &[&str] = &["Normal", "Grab", "Ungrab", "WhileGrabbed"];

// EnterNotify/LeaveNotify same-screen/focus flags
pub static FOCUS_SAME_SCREEN_MASK: &[&str] = &["focus", "same-screen"];

// EnterNotify/LeaveNotify/FocusIn/FocusOut.detail
pub static FOCUS_DETAIL: &[&str] = &[
    "Ancestor",          // 0
    "Virtual",           // 1
    "Inferior",          // 2
    "Nonlinear",         // 3
    "NonlinearVirtual",  // 4
    "Pointer",           // 5
    "PointerRoot",       // 6
    "None",              // 7
];

// VisibilityNotify.state
pub static VISIBILITY_STATE: &[&str] = &["Unobscured", "PartiallyObscured", "FullyObscured"];

// CirculateNotify/CirculateRequest.place
pub static CIRCULATE_PLACE: &[&str] = &["Top", "Bottom"];

// PropertyNotify.state
pub static PROPERTY_STATE: &[&str] = &["NewValue", "Deleted"];

// ColormapNotify.state
pub static COLORMAP_STATE: &[&str] = &["Uninstalled", "Installed"];

// MappingNotify.request
pub static MAPPING_STATE: &[&str] = &["Modifier", "Keyboard", "Pointer"];
