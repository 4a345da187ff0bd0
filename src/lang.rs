//! Embedded default SketchLang specification
//!
//! Used when no `--lang` override file is supplied. The specification is
//! prompt material: it is embedded verbatim into the system prompts so the
//! model generates code the external compiler accepts.

/// Default SketchLang specification
pub const DEFAULT_LANG_SPEC: &str = r#"# Sketch DSL Language Specification

A minimal language for generating pen plotter artwork via G-code.

## Types

- `number` - floating point value
- `vec` - 2D point (x, y)
- `sketch` - drawable primitive or list of sketches

## Syntax

statement := let_binding | render_command
let_binding := "let" IDENT ":" type "=" expr
render_command := ("trace" | "draw" | "scribble") sketch_expr

type := "number" | "vec" | "sketch"

## Expressions

### Numbers
num_expr := NUMBER | IDENT | "-" num_expr
          | num_expr ("+" | "-" | "*" | "/") num_expr
          | "(" num_expr ")"

### Vectors
vec_expr := "(" num_expr "," num_expr ")"  -- construct
          | IDENT                           -- variable
          | "origin"                        -- (0, 0)
          | "center" "of" sketch_expr       -- centroid
          | "flow" "at" vec_expr            -- flow field direction
          | vec_expr ("+" | "-") vec_expr   -- arithmetic
          | vec_expr "*" num_expr           -- scale

### Sketches
sketch_expr := primitive | IDENT | "[" sketch_list "]"
sketch_list := sketch_expr ("," sketch_expr)*

primitive := "dot" "at" vec_expr
           | "dash" "at" vec_expr
           | "stroke" "from" vec_expr "to" vec_expr ["via" vec_list]

vec_list := "[" vec_expr ("," vec_expr)* "]"

## Render Commands

| Command | Effect |
|---------|--------|
| trace | Exact rendering, no noise |
| draw | Slight wobble, hand-drawn feel |
| scribble | Heavy noise, sketchy style |

## Flow Field

dash orientation is determined by nearby stroke directions. Strokes
contribute to a flow field weighted by inverse-square distance. Default
direction is horizontal if no strokes exist.

## Important Notes

- dot notation such as vec1.x or vec1.y is NOT SUPPORTED
- variable re-assignment is NOT SUPPORTED
- Dashes can be helpful with shading
- Comments start with #
- Comments are helpful to plan and label sections
- Coordinates are in mm
- Newlines separate statements
- Flow field only affects dash, not stroke or dot
- via points create smooth Catmull-Rom splines
- Noise magnitude: scribble > draw > trace (none)
"#;
