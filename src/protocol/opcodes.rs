/*!
 * X11 Protocol Opcodes
 *
 * Defines all X11 core protocol opcodes organized by functional category,
 * plus the name tables the trace formatter renders from.
 */

/// Window management opcodes
pub mod window {
    pub const CREATE_WINDOW: u8 = 1;
    pub const CHANGE_WINDOW_ATTRIBUTES: u8 = 2;
    pub const GET_WINDOW_ATTRIBUTES: u8 = 3;
    pub const DESTROY_WINDOW: u8 = 4;
    pub const DESTROY_SUBWINDOWS: u8 = 5;
    pub const CHANGE_SAVE_SET: u8 = 6;
    pub const REPARENT_WINDOW: u8 = 7;
    pub const MAP_WINDOW: u8 = 8;
    pub const MAP_SUBWINDOWS: u8 = 9;
    pub const UNMAP_WINDOW: u8 = 10;
    pub const UNMAP_SUBWINDOWS: u8 = 11;
    pub const CONFIGURE_WINDOW: u8 = 12;
    pub const CIRCULATE_WINDOW: u8 = 13;
    pub const GET_GEOMETRY: u8 = 14;
    pub const QUERY_TREE: u8 = 15;
}

/// Atom and property opcodes
pub mod atom {
    pub const INTERN_ATOM: u8 = 16;
    pub const GET_ATOM_NAME: u8 = 17;
    pub const CHANGE_PROPERTY: u8 = 18;
    pub const DELETE_PROPERTY: u8 = 19;
    pub const GET_PROPERTY: u8 = 20;
    pub const LIST_PROPERTIES: u8 = 21;
    pub const SET_SELECTION_OWNER: u8 = 22;
    pub const GET_SELECTION_OWNER: u8 = 23;
    pub const CONVERT_SELECTION: u8 = 24;
}

/// Input and event opcodes
pub mod input {
    pub const SEND_EVENT: u8 = 25;
    pub const GRAB_POINTER: u8 = 26;
    pub const UNGRAB_POINTER: u8 = 27;
    pub const GRAB_BUTTON: u8 = 28;
    pub const UNGRAB_BUTTON: u8 = 29;
    pub const CHANGE_ACTIVE_POINTER_GRAB: u8 = 30;
    pub const GRAB_KEYBOARD: u8 = 31;
    pub const UNGRAB_KEYBOARD: u8 = 32;
    pub const GRAB_KEY: u8 = 33;
    pub const UNGRAB_KEY: u8 = 34;
    pub const ALLOW_EVENTS: u8 = 35;
    pub const GRAB_SERVER: u8 = 36;
    pub const UNGRAB_SERVER: u8 = 37;
    pub const QUERY_POINTER: u8 = 38;
    pub const GET_MOTION_EVENTS: u8 = 39;
    pub const TRANSLATE_COORDINATES: u8 = 40;
    pub const WARP_POINTER: u8 = 41;
    pub const SET_INPUT_FOCUS: u8 = 42;
    pub const GET_INPUT_FOCUS: u8 = 43;
    pub const QUERY_KEYMAP: u8 = 44;
}

/// Text and font opcodes
pub mod text {
    pub const OPEN_FONT: u8 = 45;
    pub const CLOSE_FONT: u8 = 46;
    pub const QUERY_FONT: u8 = 47;
    pub const QUERY_TEXT_EXTENTS: u8 = 48;
    pub const LIST_FONTS: u8 = 49;
    pub const LIST_FONTS_WITH_INFO: u8 = 50;
    pub const SET_FONT_PATH: u8 = 51;
    pub const GET_FONT_PATH: u8 = 52;
    pub const POLY_TEXT8: u8 = 74;
    pub const POLY_TEXT16: u8 = 75;
    pub const IMAGE_TEXT8: u8 = 76;
    pub const IMAGE_TEXT16: u8 = 77;
}

/// Pixmap opcodes
pub mod pixmap {
    pub const CREATE_PIXMAP: u8 = 53;
    pub const FREE_PIXMAP: u8 = 54;
}

/// Graphics and drawing opcodes
pub mod graphics {
    pub const CREATE_GC: u8 = 55;
    pub const CHANGE_GC: u8 = 56;
    pub const COPY_GC: u8 = 57;
    pub const SET_DASHES: u8 = 58;
    pub const SET_CLIP_RECTANGLES: u8 = 59;
    pub const FREE_GC: u8 = 60;
    pub const CLEAR_AREA: u8 = 61;
    pub const COPY_AREA: u8 = 62;
    pub const COPY_PLANE: u8 = 63;
    pub const POLY_POINT: u8 = 64;
    pub const POLY_LINE: u8 = 65;
    pub const POLY_SEGMENT: u8 = 66;
    pub const POLY_RECTANGLE: u8 = 67;
    pub const POLY_ARC: u8 = 68;
    pub const FILL_POLY: u8 = 69;
    pub const POLY_FILL_RECTANGLE: u8 = 70;
    pub const POLY_FILL_ARC: u8 = 71;
    pub const PUT_IMAGE: u8 = 72;
    pub const GET_IMAGE: u8 = 73;
}

/// Colormap opcodes
pub mod colormap {
    pub const CREATE_COLORMAP: u8 = 78;
    pub const FREE_COLORMAP: u8 = 79;
    pub const COPY_COLORMAP_AND_FREE: u8 = 80;
    pub const INSTALL_COLORMAP: u8 = 81;
    pub const UNINSTALL_COLORMAP: u8 = 82;
    pub const LIST_INSTALLED_COLORMAPS: u8 = 83;
    pub const ALLOC_COLOR: u8 = 84;
    pub const ALLOC_NAMED_COLOR: u8 = 85;
    pub const ALLOC_COLOR_CELLS: u8 = 86;
    pub const ALLOC_COLOR_PLANES: u8 = 87;
    pub const FREE_COLORS: u8 = 88;
    pub const STORE_COLORS: u8 = 89;
    pub const STORE_NAMED_COLOR: u8 = 90;
    pub const QUERY_COLORS: u8 = 91;
    pub const LOOKUP_COLOR: u8 = 92;
}

/// Cursor opcodes
pub mod cursor {
    pub const CREATE_CURSOR: u8 = 93;
    pub const CREATE_GLYPH_CURSOR: u8 = 94;
    pub const FREE_CURSOR: u8 = 95;
    pub const RECOLOR_CURSOR: u8 = 96;
}

/// Server and extension opcodes
pub mod server {
    pub const QUERY_BEST_SIZE: u8 = 97;
    pub const QUERY_EXTENSION: u8 = 98;
    pub const LIST_EXTENSIONS: u8 = 99;
    pub const CHANGE_KEYBOARD_MAPPING: u8 = 100;
    pub const GET_KEYBOARD_MAPPING: u8 = 101;
    pub const CHANGE_KEYBOARD_CONTROL: u8 = 102;
    pub const GET_KEYBOARD_CONTROL: u8 = 103;
    pub const BELL: u8 = 104;
    pub const CHANGE_POINTER_CONTROL: u8 = 105;
    pub const GET_POINTER_CONTROL: u8 = 106;
    pub const SET_SCREEN_SAVER: u8 = 107;
    pub const GET_SCREEN_SAVER: u8 = 108;
    pub const CHANGE_HOSTS: u8 = 109;
    pub const LIST_HOSTS: u8 = 110;
    pub const SET_ACCESS_CONTROL: u8 = 111;
    pub const SET_CLOSE_DOWN_MODE: u8 = 112;
    pub const KILL_CLIENT: u8 = 113;
    pub const ROTATE_PROPERTIES: u8 = 114;
    pub const FORCE_SCREEN_SAVER: u8 = 115;
    pub const SET_POINTER_MAPPING: u8 = 116;
    pub const GET_POINTER_MAPPING: u8 = 117;
    pub const SET_MODIFIER_MAPPING: u8 = 118;
    pub const GET_MODIFIER_MAPPING: u8 = 119;
    pub const NO_OPERATION: u8 = 127;
}

/// Event codes (low seven bits of the first byte of each event)
pub mod event {
    pub const KEY_PRESS: u8 = 2;
    pub const KEY_RELEASE: u8 = 3;
    pub const BUTTON_PRESS: u8 = 4;
    pub const BUTTON_RELEASE: u8 = 5;
    pub const MOTION_NOTIFY: u8 = 6;
    pub const ENTER_NOTIFY: u8 = 7;
    pub const LEAVE_NOTIFY: u8 = 8;
    pub const FOCUS_IN: u8 = 9;
    pub const FOCUS_OUT: u8 = 10;
    pub const KEYMAP_NOTIFY: u8 = 11;
    pub const EXPOSE: u8 = 12;
    pub const GRAPHICS_EXPOSURE: u8 = 13;
    pub const NO_EXPOSURE: u8 = 14;
    pub const VISIBILITY_NOTIFY: u8 = 15;
    pub const CREATE_NOTIFY: u8 = 16;
    pub const DESTROY_NOTIFY: u8 = 17;
    pub const UNMAP_NOTIFY: u8 = 18;
    pub const MAP_NOTIFY: u8 = 19;
    pub const MAP_REQUEST: u8 = 20;
    pub const REPARENT_NOTIFY: u8 = 21;
    pub const CONFIGURE_NOTIFY: u8 = 22;
    pub const CONFIGURE_REQUEST: u8 = 23;
    pub const GRAVITY_NOTIFY: u8 = 24;
    pub const RESIZE_REQUEST: u8 = 25;
    pub const CIRCULATE_NOTIFY: u8 = 26;
    pub const CIRCULATE_REQUEST: u8 = 27;
    pub const PROPERTY_NOTIFY: u8 = 28;
    pub const SELECTION_CLEAR: u8 = 29;
    pub const SELECTION_REQUEST: u8 = 30;
    pub const SELECTION_NOTIFY: u8 = 31;
    pub const COLORMAP_NOTIFY: u8 = 32;
    pub const CLIENT_MESSAGE: u8 = 33;
    pub const MAPPING_NOTIFY: u8 = 34;

    pub const MIN: u8 = KEY_PRESS;
    pub const MAX: u8 = MAPPING_NOTIFY;
    /// High bit marking an event as synthesized via SendEvent
    pub const SEND_EVENT_FLAG: u8 = 0x80;
}

/// Error codes
pub mod error {
    pub const REQUEST: u8 = 1;
    pub const VALUE: u8 = 2;
    pub const WINDOW: u8 = 3;
    pub const PIXMAP: u8 = 4;
    pub const ATOM: u8 = 5;
    pub const CURSOR: u8 = 6;
    pub const FONT: u8 = 7;
    pub const MATCH: u8 = 8;
    pub const DRAWABLE: u8 = 9;
    pub const ACCESS: u8 = 10;
    pub const ALLOC: u8 = 11;
    pub const COLORMAP: u8 = 12;
    pub const GCONTEXT: u8 = 13;
    pub const IDCHOICE: u8 = 14;
    pub const NAME: u8 = 15;
    pub const LENGTH: u8 = 16;
    pub const IMPLEMENTATION: u8 = 17;

    pub const MIN: u8 = REQUEST;
    pub const MAX: u8 = IMPLEMENTATION;
}

/// Smallest core request opcode
pub const REQUEST_MIN: u8 = 1;
/// Largest core request opcode (NoOperation)
pub const REQUEST_MAX: u8 = 127;
/// Opcodes at and above this value belong to extensions
pub const EXTENSION_MIN: u8 = 128;

const REQUEST_NAMES: [&str; 120] = [
    "(unused core opcode)",
    "CreateWindow",             //   1
    "ChangeWindowAttributes",   //   2
    "GetWindowAttributes",      //   3
    "DestroyWindow",            //   4
    "DestroySubwindows",        //   5
    "ChangeSaveSet",            //   6
    "ReparentWindow",           //   7
    "MapWindow",                //   8
    "MapSubwindows",            //   9
    "UnmapWindow",              //  10
    "UnmapSubwindows",          //  11
    "ConfigureWindow",          //  12
    "CirculateWindow",          //  13
    "GetGeometry",              //  14
    "QueryTree",                //  15
    "InternAtom",               //  16
    "GetAtomName",              //  17
    "ChangeProperty",           //  18
    "DeleteProperty",           //  19
    "GetProperty",              //  20
    "ListProperties",           //  21
    "SetSelectionOwner",        //  22
    "GetSelectionOwner",        //  23
    "ConvertSelection",         //  24
    "SendEvent",                //  25
    "GrabPointer",              //  26
    "UngrabPointer",            //  27
    "GrabButton",               //  28
    "UngrabButton",             //  29
    "ChangeActivePointerGrab",  //  30
    "GrabKeyboard",             //  31
    "UngrabKeyboard",           //  32
    "GrabKey",                  //  33
    "UngrabKey",                //  34
    "AllowEvents",              //  35
    "GrabServer",               //  36
    "UngrabServer",             //  37
    "QueryPointer",             //  38
    "GetMotionEvents",          //  39
    "TranslateCoordinates",     //  40
    "WarpPointer",              //  41
    "SetInputFocus",            //  42
    "GetInputFocus",            //  43
    "QueryKeymap",              //  44
    "OpenFont",                 //  45
    "CloseFont",                //  46
    "QueryFont",                //  47
    "QueryTextExtents",         //  48
    "ListFonts",                //  49
    "ListFontsWithInfo",        //  50
    "SetFontPath",              //  51
    "GetFontPath",              //  52
    "CreatePixmap",             //  53
    "FreePixmap",               //  54
    "CreateGC",                 //  55
    "ChangeGC",                 //  56
    "CopyGC",                   //  57
    "SetDashes",                //  58
    "SetClipRectangles",        //  59
    "FreeGC",                   //  60
    "ClearArea",                //  61
    "CopyArea",                 //  62
    "CopyPlane",                //  63
    "PolyPoint",                //  64
    "PolyLine",                 //  65
    "PolySegment",              //  66
    "PolyRectangle",            //  67
    "PolyArc",                  //  68
    "FillPoly",                 //  69
    "PolyFillRectangle",        //  70
    "PolyFillArc",              //  71
    "PutImage",                 //  72
    "GetImage",                 //  73
    "PolyText8",                //  74
    "PolyText16",               //  75
    "ImageText8",               //  76
    "ImageText16",              //  77
    "CreateColormap",           //  78
    "FreeColormap",             //  79
    "CopyColormapAndFree",      //  80
    "InstallColormap",          //  81
    "UninstallColormap",        //  82
    "ListInstalledColormaps",   //  83
    "AllocColor",               //  84
    "AllocNamedColor",          //  85
    "AllocColorCells",          //  86
    "AllocColorPlanes",         //  87
    "FreeColors",               //  88
    "StoreColors",              //  89
    "StoreNamedColor",          //  90
    "QueryColors",              //  91
    "LookupColor",              //  92
    "CreateCursor",             //  93
    "CreateGlyphCursor",        //  94
    "FreeCursor",               //  95
    "RecolorCursor",            //  96
    "QueryBestSize",            //  97
    "QueryExtension",           //  98
    "ListExtensions",           //  99
    "ChangeKeyboardMapping",    // 100
    "GetKeyboardMapping",       // 101
    "ChangeKeyboardControl",    // 102
    "GetKeyboardControl",       // 103
    "Bell",                     // 104
    "ChangePointerControl",     // 105
    "GetPointerControl",        // 106
    "SetScreenSaver",           // 107
    "GetScreenSaver",           // 108
    "ChangeHosts",              // 109
    "ListHosts",                // 110
    "SetAccessControl",         // 111
    "SetCloseDownMode",         // 112
    "KillClient",               // 113
    "RotateProperties",         // 114
    "ForceScreenSaver",         // 115
    "SetPointerMapping",        // 116
    "GetPointerMapping",        // 117
    "SetModifierMapping",       // 118
    "GetModifierMapping",       // 119
];

const EVENT_NAMES: [&str; 35] = [
    "(unused event code)",
    "(unused event code)",
    "KeyPress",          //  2
    "KeyRelease",        //  3
    "ButtonPress",       //  4
    "ButtonRelease",     //  5
    "MotionNotify",      //  6
    "EnterNotify",       //  7
    "LeaveNotify",       //  8
    "FocusIn",           //  9
    "FocusOut",          // 10
    "KeymapNotify",      // 11
    "Expose",            // 12
    "GraphicsExposure",  // 13
    "NoExposure",        // 14
    "VisibilityNotify",  // 15
    "CreateNotify",      // 16
    "DestroyNotify",     // 17
    "UnmapNotify",       // 18
    "MapNotify",         // 19
    "MapRequest",        // 20
    "ReparentNotify",    // 21
    "ConfigureNotify",   // 22
    "ConfigureRequest",  // 23
    "GravityNotify",     // 24
    "ResizeRequest",     // 25
    "CirculateNotify",   // 26
    "CirculateRequest",  // 27
    "PropertyNotify",    // 28
    "SelectionClear",    // 29
    "SelectionRequest",  // 30
    "SelectionNotify",   // 31
    "ColormapNotify",    // 32
    "ClientMessage",     // 33
    "MappingNotify",     // 34
];

const ERROR_NAMES: [&str; 18] = [
    "(unused error code)",
    "Request",         //  1
    "Value",           //  2
    "Window",          //  3
    "Pixmap",          //  4
    "Atom",            //  5
    "Cursor",          //  6
    "Font",            //  7
    "Match",           //  8
    "Drawable",        //  9
    "Access",          // 10
    "Alloc",           // 11
    "Colormap",        // 12
    "GContext",        // 13
    "IDChoice",        // 14
    "Name",            // 15
    "Length",          // 16
    "Implementation",  // 17
];

/// Name of a core request opcode; extension and unused opcodes get a
/// structural placeholder.
pub fn request_name(opcode: u8) -> &'static str {
    match opcode {
        server::NO_OPERATION => "NoOperation",
        op if op >= EXTENSION_MIN => "(extension request)",
        op if (op as usize) < REQUEST_NAMES.len() => REQUEST_NAMES[op as usize],
        _ => "(unused core opcode)",
    }
}

/// Name of a core event code (low seven bits, SendEvent bit stripped).
pub fn event_name(code: u8) -> &'static str {
    let code = code & !event::SEND_EVENT_FLAG;
    if (event::MIN..=event::MAX).contains(&code) {
        EVENT_NAMES[code as usize]
    } else if code > event::MAX {
        "(extension event)"
    } else {
        "(unused event code)"
    }
}

/// Name of a core error code.
pub fn error_name(code: u8) -> &'static str {
    if (error::MIN..=error::MAX).contains(&code) {
        ERROR_NAMES[code as usize]
    } else {
        "(extension error)"
    }
}

/// Whether this core request produces at least one reply.
pub fn has_reply(opcode: u8) -> bool {
    use self::{atom, colormap, graphics, input, server, text, window};
    matches!(
        opcode,
        window::GET_WINDOW_ATTRIBUTES
            | window::GET_GEOMETRY
            | window::QUERY_TREE
            | atom::INTERN_ATOM
            | atom::GET_ATOM_NAME
            | atom::GET_PROPERTY
            | atom::LIST_PROPERTIES
            | atom::GET_SELECTION_OWNER
            | input::GRAB_POINTER
            | input::GRAB_KEYBOARD
            | input::QUERY_POINTER
            | input::GET_MOTION_EVENTS
            | input::TRANSLATE_COORDINATES
            | input::GET_INPUT_FOCUS
            | input::QUERY_KEYMAP
            | text::QUERY_FONT
            | text::QUERY_TEXT_EXTENTS
            | text::LIST_FONTS
            | text::LIST_FONTS_WITH_INFO
            | text::GET_FONT_PATH
            | graphics::GET_IMAGE
            | colormap::LIST_INSTALLED_COLORMAPS
            | colormap::ALLOC_COLOR
            | colormap::ALLOC_NAMED_COLOR
            | colormap::ALLOC_COLOR_CELLS
            | colormap::ALLOC_COLOR_PLANES
            | colormap::QUERY_COLORS
            | colormap::LOOKUP_COLOR
            | server::QUERY_BEST_SIZE
            | server::QUERY_EXTENSION
            | server::LIST_EXTENSIONS
            | server::GET_KEYBOARD_MAPPING
            | server::GET_KEYBOARD_CONTROL
            | server::GET_POINTER_CONTROL
            | server::GET_SCREEN_SAVER
            | server::LIST_HOSTS
            | server::SET_POINTER_MAPPING
            | server::GET_POINTER_MAPPING
            | server::SET_MODIFIER_MAPPING
            | server::GET_MODIFIER_MAPPING
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_names() {
        assert_eq!(request_name(1), "CreateWindow");
        assert_eq!(request_name(14), "GetGeometry");
        assert_eq!(request_name(119), "GetModifierMapping");
        assert_eq!(request_name(127), "NoOperation");
        assert_eq!(request_name(120), "(unused core opcode)");
        assert_eq!(request_name(200), "(extension request)");
    }

    #[test]
    fn test_event_names() {
        assert_eq!(event_name(2), "KeyPress");
        assert_eq!(event_name(34), "MappingNotify");
        // SendEvent bit stripped before lookup
        assert_eq!(event_name(0x80 | 12), "Expose");
    }

    #[test]
    fn test_error_names() {
        assert_eq!(error_name(1), "Request");
        assert_eq!(error_name(3), "Window");
        assert_eq!(error_name(17), "Implementation");
    }

    #[test]
    fn test_reply_bearing() {
        assert!(has_reply(window::GET_GEOMETRY));
        assert!(has_reply(atom::INTERN_ATOM));
        assert!(!has_reply(window::DESTROY_WINDOW));
        assert!(!has_reply(server::NO_OPERATION));
    }
}
