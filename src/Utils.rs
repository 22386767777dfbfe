//! different utility modules used throughout the project
/// logger setup and saving of evaluated grids into csv files
pub mod logger;
/// parse document with structure like " title1 key1: value1, value2 key2: value2 title2 key3:value3, value4" into HashMap
pub mod task_parser;
/// intervals random settings are drawn from
pub mod random_bounds;
/// bounds of random formula/render settings and random render arguments
pub mod generation_params;
/// pretty-printed summary of render arguments
pub mod formula_report;
