mod test_curve_basic;
mod test_displacement_basic;
mod test_ribbon_basic;
